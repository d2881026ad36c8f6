//! Unified request fixtures
#![allow(dead_code)]

use std::collections::BTreeMap;

use rust_decimal_macros::dec;
use shipx::chrono::{NaiveDate, NaiveTime};
use shipx::models::{
	CancelRequest, DimensionUnit, Dimensions, PickupRequest, RateRequest, ShipmentRequest,
	TrackingRequest,
};
use shipx::{Address, Parcel, UnifiedRequest, Weight, WeightUnit};

pub struct RequestFixtures;

impl RequestFixtures {
	pub fn shipper() -> Address {
		Address {
			company_name: Some("Maple Widgets".to_string()),
			address_lines: vec!["5840 Oak Street".to_string()],
			city: Some("Vancouver".to_string()),
			state_code: Some("BC".to_string()),
			postal_code: Some("V6M 2V9".to_string()),
			..Address::new("CA")
		}
	}

	pub fn recipient() -> Address {
		Address {
			person_name: Some("Jordan Lee".to_string()),
			address_lines: vec!["100 Main Street".to_string()],
			city: Some("Seattle".to_string()),
			state_code: Some("WA".to_string()),
			postal_code: Some("98101".to_string()),
			..Address::new("US")
		}
	}

	/// 10 lb, 10 x 5.5 x 1 in
	pub fn parcel() -> Parcel {
		Parcel::new(Weight::new(dec!(10), WeightUnit::LB)).with_dimensions(Dimensions::new(
			dec!(10),
			dec!(5.5),
			dec!(1),
			DimensionUnit::IN,
		))
	}

	pub fn rate_request() -> UnifiedRequest {
		UnifiedRequest::Rate(RateRequest {
			shipper: Self::shipper(),
			recipient: Self::recipient(),
			parcels: vec![Self::parcel()],
			services: Vec::new(),
			options: BTreeMap::new(),
			reference: None,
		})
	}

	pub fn shipment_request() -> UnifiedRequest {
		UnifiedRequest::Shipment(ShipmentRequest {
			shipper: Self::shipper(),
			recipient: Self::recipient(),
			parcels: vec![Self::parcel()],
			service: "DOM.EP".to_string(),
			label_type: Default::default(),
			options: BTreeMap::new(),
			reference: Some("order-42".to_string()),
		})
	}

	pub fn pickup_request() -> UnifiedRequest {
		UnifiedRequest::Pickup(PickupRequest {
			pickup_date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
			ready_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
			closing_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
			address: Self::shipper(),
			parcels: vec![Self::parcel()],
			instruction: Some("Side door".to_string()),
			package_location: None,
		})
	}

	pub fn tracking_request(numbers: &[&str]) -> UnifiedRequest {
		UnifiedRequest::Tracking(TrackingRequest {
			tracking_numbers: numbers.iter().map(|n| n.to_string()).collect(),
			language: None,
		})
	}

	pub fn cancel_request() -> UnifiedRequest {
		UnifiedRequest::Cancel(CancelRequest {
			shipment_identifier: "SHP-1".to_string(),
			options: BTreeMap::new(),
		})
	}
}
