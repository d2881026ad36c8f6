//! Mock carriers for examples and testing
//!
//! Each [`MockCarrier`] registers like a real adapter and answers from
//! memory, so dispatch behavior can be exercised without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shipx_types::rust_decimal::Decimal;
use shipx_types::serde_json::json;
use shipx_types::{
	AdapterFactory, AdapterResult, Capability, CapabilitySet, CarrierAccount, CarrierId,
	CarrierRef, CarrierRequest, CarrierResponse, CarrierSettings, ConfirmationDetails, Gateway,
	Mapper, Metadata, Money, ParsedResponse, Proxy, RateDetails, ResultDetails, TransportError,
	UnifiedRequest,
};

/// Counts how often a mock carrier's proxy was reached
#[derive(Debug, Clone, Default)]
pub struct CallTracker {
	calls: Arc<AtomicUsize>,
}

impl CallTracker {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record_call(&self) {
		self.calls.fetch_add(1, Ordering::SeqCst);
	}

	pub fn call_count(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

/// How a mock carrier answers
#[derive(Debug, Clone)]
pub enum MockBehavior {
	/// Wait, then return `results` successes and `errors` carrier errors
	Respond {
		delay: Duration,
		results: usize,
		errors: usize,
	},
	/// Fail at the transport layer
	Fail(TransportError),
	/// Panic inside the proxy
	Panic,
}

/// A configurable in-memory carrier
#[derive(Debug, Clone)]
pub struct MockCarrier {
	pub id: CarrierId,
	pub capabilities: CapabilitySet,
	pub behavior: MockBehavior,
	pub is_aggregator: bool,
	pub tracker: CallTracker,
}

impl MockCarrier {
	pub fn new(id: &str, behavior: MockBehavior) -> Self {
		Self {
			id: CarrierId::new(id),
			capabilities: CapabilitySet::all(),
			behavior,
			is_aggregator: false,
			tracker: CallTracker::new(),
		}
	}

	/// Answers with one result after ~10ms
	pub fn fast(id: &str) -> Self {
		Self::responding(id, Duration::from_millis(10), 1, 0)
	}

	/// Answers with one result after `delay`
	pub fn slow(id: &str, delay: Duration) -> Self {
		Self::responding(id, delay, 1, 0)
	}

	/// Answers with a mix of results and carrier errors
	pub fn partial(id: &str, results: usize, errors: usize) -> Self {
		Self::responding(id, Duration::from_millis(10), results, errors)
	}

	/// Refuses connections
	pub fn failing(id: &str) -> Self {
		Self::new(
			id,
			MockBehavior::Fail(TransportError::Connect {
				url: format!("https://{}.mock.invalid", id),
				reason: "connection refused".to_string(),
			}),
		)
	}

	pub fn panicking(id: &str) -> Self {
		Self::new(id, MockBehavior::Panic)
	}

	pub fn responding(id: &str, delay: Duration, results: usize, errors: usize) -> Self {
		Self::new(
			id,
			MockBehavior::Respond {
				delay,
				results,
				errors,
			},
		)
	}

	pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
		self.capabilities = capabilities;
		self
	}

	pub fn as_aggregator(mut self) -> Self {
		self.is_aggregator = true;
		self
	}

	/// Descriptor to register; shares this carrier's call tracker
	pub fn metadata(&self) -> Metadata {
		let metadata = Metadata::new(
			self.id.clone(),
			format!("Mock {}", self.id),
			"1.0.0",
			Arc::new(MockFactory {
				carrier: self.clone(),
			}),
		)
		.with_capabilities(self.capabilities)
		.with_sandbox_account(CarrierAccount::new(self.id.clone(), "sandbox"));
		if self.is_aggregator {
			metadata.as_aggregator()
		} else {
			metadata
		}
	}

	/// An account for this carrier with nothing to configure
	pub fn account(&self, account_id: &str) -> CarrierAccount {
		CarrierAccount::new(self.id.clone(), account_id)
	}
}

#[derive(Debug)]
struct MockFactory {
	carrier: MockCarrier,
}

impl AdapterFactory for MockFactory {
	fn create_gateway(&self, settings: Arc<CarrierSettings>) -> AdapterResult<Gateway> {
		let target = CarrierRef::new(settings.carrier_id().clone(), settings.account_id());
		let (results, errors) = match self.carrier.behavior {
			MockBehavior::Respond {
				results, errors, ..
			} => (results, errors),
			_ => (0, 0),
		};
		Ok(Gateway::new(
			Arc::new(MockMapper {
				target,
				results,
				errors,
			}),
			Arc::new(MockProxy {
				carrier_id: self.carrier.id.clone(),
				behavior: self.carrier.behavior.clone(),
				tracker: self.carrier.tracker.clone(),
			}),
		))
	}
}

#[derive(Debug)]
struct MockMapper {
	target: CarrierRef,
	results: usize,
	errors: usize,
}

impl Mapper for MockMapper {
	fn carrier_id(&self) -> &CarrierId {
		&self.target.carrier_id
	}

	fn to_carrier_request(&self, request: &UnifiedRequest) -> AdapterResult<CarrierRequest> {
		Ok(CarrierRequest::json(
			self.target.carrier_id.clone(),
			request.capability(),
			json!({ "account": self.target.account_id }),
		))
	}

	fn from_carrier_response(&self, response: CarrierResponse) -> ParsedResponse {
		let results = (0..self.results)
			.map(|i| {
				let details = match response.operation {
					Capability::Rating => ResultDetails::Rate(RateDetails {
						service: format!("MOCK_{}", i + 1),
						total_charge: Money::new(Decimal::new(1000 + i as i64 * 250, 2), "USD"),
						base_charge: None,
						extra_charges: Vec::new(),
						transit_days: Some(i as u32 + 1),
						sub_carrier: None,
					}),
					operation => ResultDetails::Confirmation(ConfirmationDetails {
						operation,
						success: true,
					}),
				};
				self.target.result(details)
			})
			.collect();
		let errors = (0..self.errors)
			.map(|i| {
				self.target
					.error(format!("MOCK_{}", 900 + i), "Service unavailable for this lane")
			})
			.collect();
		ParsedResponse::new(results, errors)
	}
}

#[derive(Debug)]
struct MockProxy {
	carrier_id: CarrierId,
	behavior: MockBehavior,
	tracker: CallTracker,
}

#[async_trait]
impl Proxy for MockProxy {
	fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	async fn send(&self, request: CarrierRequest) -> Result<CarrierResponse, TransportError> {
		self.ensure_origin(&request)?;
		self.tracker.record_call();
		match &self.behavior {
			MockBehavior::Respond { delay, .. } => {
				tokio::time::sleep(*delay).await;
				let body = request.encode()?;
				Ok(CarrierResponse::new(
					self.carrier_id.clone(),
					request.operation(),
					200,
					body.into_bytes(),
				))
			},
			MockBehavior::Fail(error) => Err(error.clone()),
			MockBehavior::Panic => panic!("mock carrier {} panicked", self.carrier_id),
		}
	}
}
