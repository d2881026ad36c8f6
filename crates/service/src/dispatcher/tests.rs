use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal_macros::dec;
use shipx_adapters::AdapterRegistry;
use shipx_types::chrono::{NaiveDate, NaiveTime};
use shipx_types::{
	codes, Address, AdapterResult, Capability, CapabilitySet, CarrierAccount, CarrierId,
	CarrierRef, CarrierRequest, CarrierResponse, Gateway, Mapper, Money, ParsedResponse, Parcel,
	PickupRequest, Proxy, RateDetails, RateRequest, ResultDetails, TrackingRequest, TransportError,
	UnifiedRequest, Weight, WeightUnit,
};

use super::*;

#[derive(Debug, Clone, Copy)]
enum Behavior {
	Respond { delay_ms: u64, rates: usize },
	Fail,
	Panic,
}

#[derive(Debug)]
struct StubMapper {
	target: CarrierRef,
	rates: usize,
}

impl Mapper for StubMapper {
	fn carrier_id(&self) -> &CarrierId {
		&self.target.carrier_id
	}

	fn to_carrier_request(&self, request: &UnifiedRequest) -> AdapterResult<CarrierRequest> {
		Ok(CarrierRequest::json(
			self.target.carrier_id.clone(),
			request.capability(),
			shipx_types::serde_json::json!({}),
		))
	}

	fn from_carrier_response(&self, _response: CarrierResponse) -> ParsedResponse {
		let results = (0..self.rates)
			.map(|i| {
				self.target.result(ResultDetails::Rate(RateDetails {
					service: format!("SVC{}", i),
					total_charge: Money::new(dec!(10.00), "USD"),
					base_charge: None,
					extra_charges: Vec::new(),
					transit_days: None,
					sub_carrier: None,
				}))
			})
			.collect();
		ParsedResponse::new(results, Vec::new())
	}
}

#[derive(Debug)]
struct StubProxy {
	carrier_id: CarrierId,
	behavior: Behavior,
	calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Proxy for StubProxy {
	fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	async fn send(&self, request: CarrierRequest) -> Result<CarrierResponse, TransportError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		match self.behavior {
			Behavior::Respond { delay_ms, .. } => {
				tokio::time::sleep(Duration::from_millis(delay_ms)).await;
				Ok(CarrierResponse::new(
					self.carrier_id.clone(),
					request.operation(),
					200,
					b"{}".to_vec(),
				))
			},
			Behavior::Fail => Err(TransportError::Connect {
				url: "https://unreachable.test".to_string(),
				reason: "connection refused".to_string(),
			}),
			Behavior::Panic => panic!("stub proxy exploded"),
		}
	}
}

fn connection(
	carrier_id: &str,
	capabilities: CapabilitySet,
	behavior: Behavior,
) -> (Connection, Arc<AtomicUsize>) {
	let target = CarrierRef::new(carrier_id, "acct");
	let calls = Arc::new(AtomicUsize::new(0));
	let rates = match behavior {
		Behavior::Respond { rates, .. } => rates,
		_ => 0,
	};
	let gateway = Gateway::new(
		Arc::new(StubMapper {
			target: target.clone(),
			rates,
		}),
		Arc::new(StubProxy {
			carrier_id: CarrierId::new(carrier_id),
			behavior,
			calls: calls.clone(),
		}),
	);
	(Connection::from_gateway(target, capabilities, gateway), calls)
}

fn respond(delay_ms: u64, rates: usize) -> Behavior {
	Behavior::Respond { delay_ms, rates }
}

fn rate_request() -> UnifiedRequest {
	UnifiedRequest::Rate(RateRequest {
		shipper: Address::new("CA"),
		recipient: Address::new("US"),
		parcels: vec![Parcel::new(Weight::new(dec!(2), WeightUnit::KG))],
		services: Vec::new(),
		options: Default::default(),
		reference: None,
	})
}

fn dispatcher(batch_ms: u64, per_carrier_ms: u64) -> Dispatcher {
	Dispatcher::new(
		Arc::new(AdapterRegistry::with_defaults()),
		DispatchConfig::new(
			Duration::from_millis(batch_ms),
			Duration::from_millis(per_carrier_ms),
		),
	)
}

#[tokio::test]
async fn test_failing_carrier_is_isolated() {
	let (a, _) = connection("alpha", CapabilitySet::all(), respond(10, 1));
	let (b, _) = connection("bravo", CapabilitySet::all(), respond(10, 1));
	let (c, _) = connection("charlie", CapabilitySet::all(), Behavior::Fail);

	let outcome = dispatcher(2_000, 1_000)
		.dispatch(rate_request(), vec![a.into(), b.into(), c.into()])
		.await
		.unwrap()
		.sorted();

	assert_eq!(outcome.results.len(), 2);
	assert_eq!(outcome.errors.len(), 1);
	assert_eq!(outcome.errors[0].carrier_id, "charlie");
	assert_eq!(outcome.errors[0].code, codes::TRANSPORT);
}

#[tokio::test]
async fn test_slow_carrier_times_out_without_blocking_others() {
	let (fast, _) = connection("fast", CapabilitySet::all(), respond(10, 1));
	let (slow, _) = connection("slow", CapabilitySet::all(), respond(5_000, 1));

	let started = Instant::now();
	let outcome = dispatcher(2_000, 200)
		.dispatch(rate_request(), vec![fast.into(), slow.into()])
		.await
		.unwrap();

	assert!(started.elapsed() < Duration::from_millis(1_500));
	assert_eq!(outcome.results_for("fast").len(), 1);
	let errors = outcome.errors_for("slow");
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].code, codes::TIMEOUT);
	assert_eq!(errors[0].details.get("timeout_ms").map(String::as_str), Some("200"));
}

#[tokio::test]
async fn test_batch_deadline_caps_account_override() {
	let (slow, _) = connection("slow", CapabilitySet::all(), respond(5_000, 1));
	let slow = slow.with_timeout_ms(60_000);

	let started = Instant::now();
	let outcome = dispatcher(150, 100)
		.dispatch(rate_request(), vec![slow.into()])
		.await
		.unwrap();

	assert!(started.elapsed() < Duration::from_millis(1_000));
	assert!(outcome.results.is_empty());
	assert_eq!(outcome.errors.len(), 1);
	assert_eq!(outcome.errors[0].code, codes::TIMEOUT);
}

#[tokio::test]
async fn test_unsupported_capability_never_reaches_proxy() {
	let rating_only = CapabilitySet::none().with(Capability::Rating);
	let (conn, calls) = connection("ratesonly", rating_only, respond(0, 1));

	let request = UnifiedRequest::Tracking(TrackingRequest {
		tracking_numbers: vec!["1Z999".to_string()],
		language: None,
	});
	let outcome = dispatcher(1_000, 500)
		.dispatch(request, vec![conn.into()])
		.await
		.unwrap();

	assert_eq!(calls.load(Ordering::SeqCst), 0);
	assert_eq!(outcome.errors.len(), 1);
	assert_eq!(outcome.errors[0].code, codes::UNSUPPORTED_OPERATION);
}

#[tokio::test]
async fn test_panicking_carrier_becomes_internal_error() {
	let (ok, _) = connection("steady", CapabilitySet::all(), respond(0, 2));
	let (boom, _) = connection("boom", CapabilitySet::all(), Behavior::Panic);

	let outcome = dispatcher(1_000, 500)
		.dispatch(rate_request(), vec![ok.into(), boom.into()])
		.await
		.unwrap();

	assert_eq!(outcome.results_for("steady").len(), 2);
	let errors = outcome.errors_for("boom");
	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].code, codes::INTERNAL);
	assert!(errors[0].message.contains("stub proxy exploded"));
}

#[tokio::test]
async fn test_repeated_dispatch_is_order_independent() {
	let build = || -> Vec<DispatchTarget> {
		vec![
			connection("zulu", CapabilitySet::all(), respond(30, 2)).0.into(),
			connection("alpha", CapabilitySet::all(), respond(5, 1)).0.into(),
			connection("mike", CapabilitySet::all(), Behavior::Fail).0.into(),
		]
	};
	let service = dispatcher(1_000, 500);

	let first = service.dispatch(rate_request(), build()).await.unwrap();
	let second = service.dispatch(rate_request(), build()).await.unwrap();
	assert_eq!(first.sorted(), second.sorted());
}

#[tokio::test]
async fn test_unknown_carrier_and_invalid_settings_stay_per_target() {
	let dicom = CarrierAccount::new("dicom", "main")
		.with_option("username", "ops")
		.with_option("api_key", "unexpected");
	let ghost = CarrierAccount::new("ghost", "main");
	let (ok, _) = connection("steady", CapabilitySet::all(), respond(0, 1));

	let outcome = dispatcher(1_000, 500)
		.dispatch(rate_request(), vec![dicom.into(), ghost.into(), ok.into()])
		.await
		.unwrap()
		.sorted();

	assert_eq!(outcome.results.len(), 1);
	let error_codes: Vec<&str> = outcome.errors.iter().map(|e| e.code.as_str()).collect();
	assert_eq!(error_codes, vec![codes::INVALID_SETTINGS, codes::UNKNOWN_CARRIER]);
	let fields = outcome.errors[0].details.get("fields").cloned().unwrap_or_default();
	assert!(fields.contains("password"));
	assert!(fields.contains("api_key"));
}

#[tokio::test]
async fn test_account_capability_checked_before_settings() {
	// fedex has no pickup support; its settings are never inspected
	let fedex = CarrierAccount::new("fedex", "main");
	let request = UnifiedRequest::Pickup(PickupRequest {
		address: Address::new("US"),
		parcels: vec![Parcel::new(Weight::new(dec!(1), WeightUnit::LB))],
		pickup_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
		ready_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
		closing_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
		instruction: None,
		package_location: None,
	});

	let outcome = dispatcher(1_000, 500)
		.dispatch(request, vec![fedex.into()])
		.await
		.unwrap();
	assert_eq!(outcome.errors.len(), 1);
	assert_eq!(outcome.errors[0].code, codes::UNSUPPORTED_OPERATION);
}

#[tokio::test]
async fn test_invalid_request_and_empty_targets_fail_outright() {
	let service = dispatcher(1_000, 500);
	let empty = UnifiedRequest::Tracking(TrackingRequest {
		tracking_numbers: Vec::new(),
		language: None,
	});
	let (conn, calls) = connection("steady", CapabilitySet::all(), respond(0, 1));

	assert!(matches!(
		service.dispatch(empty, vec![conn.into()]).await,
		Err(DispatchError::InvalidRequest(_))
	));
	assert!(matches!(
		service.dispatch(rate_request(), Vec::new()).await,
		Err(DispatchError::NoTargets)
	));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_timeout_clamped_to_batch_deadline() {
	let config = DispatchConfig::new(Duration::from_secs(5), Duration::from_secs(2));
	assert_eq!(config.timeout_for(None), Duration::from_secs(2));
	assert_eq!(config.timeout_for(Some(500)), Duration::from_millis(500));
	assert_eq!(config.timeout_for(Some(60_000)), Duration::from_secs(5));
}
