use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use shipx_types::{
	codes, Address, CancelRequest, Capability, CarrierAccount, CarrierId, CarrierRequest,
	CarrierResponse, CarrierSettings, DimensionUnit, Dimensions, Environment, LabelType, Mapper,
	Money, Parcel, PickupRequest, RateRequest, ResultDetails, ShipmentRequest, TrackingRequest,
	TransportError, UnifiedRequest, Weight, WeightUnit,
};

use super::*;
use crate::http::{HttpRequest, HttpResponse, MockHttpTransport};

fn account() -> CarrierAccount {
	CarrierAccount::new(CARRIER_ID, "main")
		.with_option("username", "ops")
		.with_option("password", "s3cret")
		.with_option("billing_account", "2349857")
}

fn settings() -> Arc<CarrierSettings> {
	let metadata = metadata(&AdapterOptions::default());
	Arc::new(CarrierSettings::new(&metadata, &account()).unwrap())
}

fn mapper() -> DicomMapper {
	DicomMapper::new(DicomSettings::from_settings(&settings()).unwrap())
}

fn address(country: &str, postal: &str) -> Address {
	Address {
		company_name: Some("Acme".to_string()),
		address_lines: vec!["1 Main St".to_string(), "Suite 4".to_string()],
		city: Some("Montreal".to_string()),
		state_code: Some("QC".to_string()),
		postal_code: Some(postal.to_string()),
		..Address::new(country)
	}
}

fn rate_request() -> RateRequest {
	RateRequest {
		shipper: address("CA", "h3a 1b2"),
		recipient: address("CA", "M5V 2T6"),
		parcels: vec![Parcel::new(Weight::new(dec!(10), WeightUnit::LB)).with_dimensions(
			Dimensions::new(dec!(10), dec!(5.5), dec!(1), DimensionUnit::IN),
		)],
		services: vec!["DOM.EP".to_string()],
		options: BTreeMap::from([
			("insurance".to_string(), "100".to_string()),
			("gift_wrap".to_string(), "yes".to_string()),
		]),
		reference: Some("order-42".to_string()),
	}
}

fn encoded(request: &UnifiedRequest) -> Value {
	let carrier_request = mapper().to_carrier_request(request).unwrap();
	serde_json::from_str(&carrier_request.encode().unwrap()).unwrap()
}

fn response(operation: Capability, status: u16, body: Value) -> CarrierResponse {
	CarrierResponse::new(
		CARRIER_ID.into(),
		operation,
		status,
		body.to_string().into_bytes(),
	)
}

#[test]
fn test_rate_request_converts_units_and_fields() {
	let payload = encoded(&UnifiedRequest::Rate(rate_request()));

	assert_eq!(payload["billingAccount"], "2349857");
	assert_eq!(payload["sender"]["postalCode"], "H3A1B2");
	assert_eq!(payload["sender"]["addressLine2"], "Suite 4");
	assert_eq!(payload["parcels"][0]["weight"], "4.54");
	assert_eq!(payload["parcels"][0]["length"], "25.4");
	assert_eq!(payload["parcels"][0]["width"], "14.0");
	assert_eq!(payload["parcels"][0]["height"], "2.5");
	assert_eq!(payload["parcels"][0]["parcelType"], "Parcel");
	assert_eq!(payload["services"], json!(["DOM.EP"]));
	assert_eq!(payload["surcharges"], json!([{"type": "DCV", "value": "100.00"}]));
}

#[test]
fn test_mapping_is_deterministic() {
	let request = UnifiedRequest::Rate(rate_request());
	let first = mapper().to_carrier_request(&request).unwrap().encode().unwrap();
	let second = mapper().to_carrier_request(&request).unwrap().encode().unwrap();
	assert_eq!(first, second);
}

#[test]
fn test_weight_round_trips_within_precision() {
	// 3.7 kg -> lb (2 dp) -> kg (2 dp) through the mapper's precision
	let pounds = Weight::new(dec!(3.7), WeightUnit::KG)
		.in_unit(WeightUnit::LB, 2)
		.unwrap();
	let mut request = rate_request();
	request.parcels = vec![Parcel::new(Weight::new(pounds, WeightUnit::LB))];

	let payload = encoded(&UnifiedRequest::Rate(request));
	let kg: rust_decimal::Decimal = payload["parcels"][0]["weight"].as_str().unwrap().parse().unwrap();
	assert!((kg - dec!(3.7)).abs() <= dec!(0.01));
}

#[test]
fn test_shipment_pickup_tracking_and_cancel_requests() {
	let payload = encoded(&UnifiedRequest::Shipment(ShipmentRequest {
		service: "DOM.XP".to_string(),
		shipper: address("CA", "H3A1B2"),
		recipient: address("CA", "M5V2T6"),
		parcels: vec![Parcel::new(Weight::new(dec!(500), WeightUnit::G))],
		label_type: LabelType::Zpl,
		options: BTreeMap::new(),
		reference: None,
	}));
	assert_eq!(payload["service"], "DOM.XP");
	assert_eq!(payload["labelFormat"], "ZPL");
	assert_eq!(payload["parcels"][0]["weight"], "0.50");

	let payload = encoded(&UnifiedRequest::Pickup(PickupRequest {
		pickup_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
		ready_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
		closing_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
		address: address("CA", "H3A1B2"),
		parcels: vec![
			Parcel::new(Weight::new(dec!(1), WeightUnit::LB)),
			Parcel::new(Weight::new(dec!(16), WeightUnit::OZ)),
		],
		instruction: Some("Side door".to_string()),
		package_location: None,
	}));
	assert_eq!(payload["date"], "2024-03-04");
	assert_eq!(payload["readyTime"], "09:30");
	assert_eq!(payload["parcelCount"], 2);
	assert_eq!(payload["totalWeight"], "0.91");

	let payload = encoded(&UnifiedRequest::Tracking(TrackingRequest {
		tracking_numbers: vec![" 7023210039414604 ".to_string()],
		language: Some("FR".to_string()),
	}));
	assert_eq!(payload, json!({"trackingNumbers": ["7023210039414604"], "language": "fr"}));

	let payload = encoded(&UnifiedRequest::Cancel(CancelRequest {
		shipment_identifier: "SHP-1".to_string(),
		options: BTreeMap::new(),
	}));
	assert_eq!(payload, json!({"shipmentId": "SHP-1"}));
}

#[test]
fn test_rate_response_with_partial_success() {
	let parsed = mapper().from_carrier_response(response(
		Capability::Rating,
		200,
		json!({
			"rates": [
				{
					"serviceCode": "DOM.EP",
					"transitDays": 2,
					"baseCharge": "12.40",
					"surcharges": [{"type": "FUEL", "amount": "1.30"}],
					"taxes": [{"type": "GST", "amount": "0.69"}],
					"total": "14.39",
					"currency": "CAD"
				},
				{
					"serviceCode": "DOM.XP",
					"baseCharge": "20.00",
					"total": "20.00",
					"currency": "CAD"
				}
			],
			"errors": [
				{"code": "9111", "message": "Priority not available", "serviceCode": "DOM.PC"}
			]
		}),
	));

	assert_eq!(parsed.results.len(), 2);
	assert_eq!(parsed.errors.len(), 1);
	assert_eq!(parsed.errors[0].code, "9111");
	assert_eq!(parsed.errors[0].details["service_code"], "DOM.PC");
	assert_eq!(parsed.errors[0].account_id, "main");

	match &parsed.results[0].details {
		ResultDetails::Rate(rate) => {
			assert_eq!(rate.service, "DOM.EP");
			assert_eq!(rate.total_charge, Money::new(dec!(14.39), "CAD"));
			assert_eq!(rate.extra_charges.len(), 2);
			assert_eq!(rate.transit_days, Some(2));
		},
		other => panic!("expected a rate, got {:?}", other),
	}
}

#[test]
fn test_bad_amount_becomes_parse_error_for_that_rate() {
	let parsed = mapper().from_carrier_response(response(
		Capability::Rating,
		200,
		json!({"rates": [
			{"serviceCode": "DOM.EP", "baseCharge": "1.00", "total": "n/a", "currency": "CAD"},
			{"serviceCode": "DOM.XP", "baseCharge": "2.00", "total": "2.00", "currency": "CAD"}
		]}),
	));
	assert_eq!(parsed.results.len(), 1);
	assert_eq!(parsed.errors[0].code, codes::PARSE_ERROR);
	assert_eq!(parsed.errors[0].details["service_code"], "DOM.EP");
}

#[test]
fn test_undecodable_body_is_parse_error() {
	let response = CarrierResponse::new(
		CARRIER_ID.into(),
		Capability::Rating,
		200,
		b"<html>gateway error</html>".to_vec(),
	);
	let parsed = mapper().from_carrier_response(response);
	assert!(parsed.results.is_empty());
	assert_eq!(parsed.errors.len(), 1);
	assert_eq!(parsed.errors[0].code, codes::PARSE_ERROR);
	assert_eq!(parsed.errors[0].carrier_id, CARRIER_ID);
}

#[test]
fn test_business_error_status_without_entries() {
	let parsed = mapper().from_carrier_response(response(Capability::Tracking, 404, json!({})));
	assert_eq!(parsed.errors.len(), 1);
	assert_eq!(parsed.errors[0].code, codes::TRANSPORT);
	assert_eq!(parsed.errors[0].details["status"], "404");
}

#[test]
fn test_tracking_events_newest_first() {
	let parsed = mapper().from_carrier_response(response(
		Capability::Tracking,
		200,
		json!({"trackings": [{
			"trackingNumber": "7023210039414604",
			"delivered": true,
			"events": [
				{"date": "2024-03-04T08:00:00", "code": "PU", "description": "Picked up"},
				{"date": "2024-03-05T15:20:00", "code": "DL", "description": "Delivered", "location": "Toronto"}
			]
		}]}),
	));
	match &parsed.results[0].details {
		ResultDetails::Tracking(tracking) => {
			assert!(tracking.delivered);
			assert_eq!(tracking.events[0].code, "DL");
			assert_eq!(tracking.events[1].code, "PU");
		},
		other => panic!("expected tracking, got {:?}", other),
	}
}

#[test]
fn test_shipment_pickup_and_cancel_responses() {
	let parsed = mapper().from_carrier_response(response(
		Capability::Shipping,
		200,
		json!({"shipmentId": "SHP-1", "trackingNumber": "7023", "label": "JVBERi0=", "labelFormat": "PDF"}),
	));
	match &parsed.results[0].details {
		ResultDetails::Shipment(shipment) => {
			assert_eq!(shipment.shipment_identifier, "SHP-1");
			assert_eq!(shipment.label_type, LabelType::Pdf);
		},
		other => panic!("expected shipment, got {:?}", other),
	}

	let parsed = mapper().from_carrier_response(response(
		Capability::Pickup,
		200,
		json!({"pickupId": "PU-9", "date": "2024-03-04", "charge": {"amount": "5.00", "currency": "cad"}}),
	));
	match &parsed.results[0].details {
		ResultDetails::Pickup(pickup) => {
			assert_eq!(pickup.confirmation_number, "PU-9");
			assert_eq!(pickup.pickup_charge, Some(Money::new(dec!(5.00), "CAD")));
		},
		other => panic!("expected pickup, got {:?}", other),
	}

	let parsed = mapper().from_carrier_response(response(
		Capability::Cancel,
		422,
		json!({"cancelled": false, "errors": [{"code": "8001", "message": "Already manifested"}]}),
	));
	assert!(parsed.results.is_empty());
	assert_eq!(parsed.errors[0].code, "8001");
}

#[test]
fn test_missing_credentials_rejected_with_every_field() {
	let metadata = metadata(&AdapterOptions::default());
	let account = CarrierAccount::new(CARRIER_ID, "main").with_option("billing_account", "12a");
	let error = CarrierSettings::new(&metadata, &account).unwrap_err();
	assert!(error.mentions("username"));
	assert!(error.mentions("password"));
	assert!(error.mentions("billing_account"));
}

#[tokio::test]
async fn test_gateway_sends_to_environment_endpoint_with_basic_auth() {
	let mut transport = MockHttpTransport::new();
	transport
		.expect_execute()
		.withf(|request: &HttpRequest| {
			request.url == "https://soa-gw.canadapost.ca/v1/tracking"
				// base64("ops:s3cret")
				&& request.headers.get("authorization").map(String::as_str)
					== Some("Basic b3BzOnMzY3JldA==")
		})
		.times(1)
		.returning(|_| {
			Ok(HttpResponse::new(
				200,
				r#"{"trackings":[{"trackingNumber":"1","delivered":false,"events":[]}]}"#,
			))
		});

	let options = AdapterOptions::default().with_transport(Arc::new(transport));
	let metadata = metadata(&options);
	let account = account().with_environment(Environment::Production);
	let settings = Arc::new(CarrierSettings::new(&metadata, &account).unwrap());
	let gateway = metadata.factory.create_gateway(settings).unwrap();

	let request = UnifiedRequest::Tracking(TrackingRequest {
		tracking_numbers: vec!["1".to_string()],
		language: None,
	});
	let carrier_request = gateway.mapper.to_carrier_request(&request).unwrap();
	let response = gateway.proxy.send(carrier_request).await.unwrap();
	let parsed = gateway.mapper.from_carrier_response(response);

	assert_eq!(parsed.results.len(), 1);
	assert!(parsed.errors.is_empty());
}

#[tokio::test]
async fn test_proxy_refuses_request_built_by_another_carrier() {
	let mut transport = MockHttpTransport::new();
	transport.expect_execute().times(0);

	let options = AdapterOptions::default().with_transport(Arc::new(transport));
	let metadata = metadata(&options);
	let gateway = metadata.factory.create_gateway(settings()).unwrap();

	let foreign = CarrierRequest::json(
		CarrierId::new("fedex"),
		Capability::Rating,
		json!({ "origin": "H3A1B2" }),
	);
	let error = gateway.proxy.send(foreign).await.unwrap_err();

	assert_eq!(
		error,
		TransportError::CarrierMismatch {
			proxy: CarrierId::new(CARRIER_ID),
			request: CarrierId::new("fedex"),
		}
	);
}
