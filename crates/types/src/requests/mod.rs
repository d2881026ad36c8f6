//! Unified requests: one call shape for every carrier

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::carriers::Capability;
use crate::models::{Address, Parcel};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
	#[error("Request has no parcels")]
	NoParcels,

	#[error("Parcel {index} has a non-positive weight")]
	NonPositiveWeight { index: usize },

	#[error("Parcel {index} has a non-positive dimension")]
	NonPositiveDimension { index: usize },

	#[error("Invalid country code for {field}: {value}")]
	InvalidCountryCode { field: &'static str, value: String },

	#[error("Tracking request has no tracking numbers")]
	NoTrackingNumbers,

	#[error("Tracking number {index} is blank")]
	BlankTrackingNumber { index: usize },

	#[error("Pickup closing time {closing_time} is not after ready time {ready_time}")]
	InvalidPickupWindow {
		ready_time: NaiveTime,
		closing_time: NaiveTime,
	},

	#[error("Missing required field: {field}")]
	MissingField { field: &'static str },
}

pub type RequestValidationResult = Result<(), RequestValidationError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LabelType {
	#[default]
	Pdf,
	Zpl,
	Png,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRequest {
	pub shipper: Address,
	pub recipient: Address,
	pub parcels: Vec<Parcel>,
	/// Restrict quotes to these carrier service codes; empty means all
	#[serde(default)]
	pub services: Vec<String>,
	#[serde(default)]
	pub options: BTreeMap<String, String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentRequest {
	pub service: String,
	pub shipper: Address,
	pub recipient: Address,
	pub parcels: Vec<Parcel>,
	#[serde(default)]
	pub label_type: LabelType,
	#[serde(default)]
	pub options: BTreeMap<String, String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupRequest {
	pub pickup_date: NaiveDate,
	pub ready_time: NaiveTime,
	pub closing_time: NaiveTime,
	pub address: Address,
	pub parcels: Vec<Parcel>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub instruction: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub package_location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingRequest {
	pub tracking_numbers: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
	pub shipment_identifier: String,
	#[serde(default)]
	pub options: BTreeMap<String, String>,
}

/// A carrier-agnostic request
///
/// Built once per call and shared read-only by every carrier pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UnifiedRequest {
	Rate(RateRequest),
	Shipment(ShipmentRequest),
	Pickup(PickupRequest),
	Tracking(TrackingRequest),
	Cancel(CancelRequest),
}

impl UnifiedRequest {
	/// The carrier capability needed to serve this request
	pub fn capability(&self) -> Capability {
		match self {
			Self::Rate(_) => Capability::Rating,
			Self::Shipment(_) => Capability::Shipping,
			Self::Pickup(_) => Capability::Pickup,
			Self::Tracking(_) => Capability::Tracking,
			Self::Cancel(_) => Capability::Cancel,
		}
	}

	/// Reject structurally invalid requests before any carrier is contacted
	pub fn validate(&self) -> RequestValidationResult {
		match self {
			Self::Rate(request) => {
				validate_address("shipper", &request.shipper)?;
				validate_address("recipient", &request.recipient)?;
				validate_parcels(&request.parcels)
			},
			Self::Shipment(request) => {
				if request.service.trim().is_empty() {
					return Err(RequestValidationError::MissingField { field: "service" });
				}
				validate_address("shipper", &request.shipper)?;
				validate_address("recipient", &request.recipient)?;
				validate_parcels(&request.parcels)
			},
			Self::Pickup(request) => {
				if request.closing_time <= request.ready_time {
					return Err(RequestValidationError::InvalidPickupWindow {
						ready_time: request.ready_time,
						closing_time: request.closing_time,
					});
				}
				validate_address("address", &request.address)?;
				validate_parcels(&request.parcels)
			},
			Self::Tracking(request) => {
				if request.tracking_numbers.is_empty() {
					return Err(RequestValidationError::NoTrackingNumbers);
				}
				match request
					.tracking_numbers
					.iter()
					.position(|number| number.trim().is_empty())
				{
					Some(index) => Err(RequestValidationError::BlankTrackingNumber { index }),
					None => Ok(()),
				}
			},
			Self::Cancel(request) => {
				if request.shipment_identifier.trim().is_empty() {
					return Err(RequestValidationError::MissingField {
						field: "shipment_identifier",
					});
				}
				Ok(())
			},
		}
	}
}

fn validate_address(field: &'static str, address: &Address) -> RequestValidationResult {
	if !address.has_valid_country_code() {
		return Err(RequestValidationError::InvalidCountryCode {
			field,
			value: address.country_code.clone(),
		});
	}
	Ok(())
}

fn validate_parcels(parcels: &[Parcel]) -> RequestValidationResult {
	if parcels.is_empty() {
		return Err(RequestValidationError::NoParcels);
	}
	for (index, parcel) in parcels.iter().enumerate() {
		if parcel.weight.value <= Decimal::ZERO {
			return Err(RequestValidationError::NonPositiveWeight { index });
		}
		if matches!(&parcel.dimensions, Some(dims) if !dims.is_positive()) {
			return Err(RequestValidationError::NonPositiveDimension { index });
		}
	}
	Ok(())
}

impl From<RateRequest> for UnifiedRequest {
	fn from(request: RateRequest) -> Self {
		Self::Rate(request)
	}
}

impl From<ShipmentRequest> for UnifiedRequest {
	fn from(request: ShipmentRequest) -> Self {
		Self::Shipment(request)
	}
}

impl From<PickupRequest> for UnifiedRequest {
	fn from(request: PickupRequest) -> Self {
		Self::Pickup(request)
	}
}

impl From<TrackingRequest> for UnifiedRequest {
	fn from(request: TrackingRequest) -> Self {
		Self::Tracking(request)
	}
}

impl From<CancelRequest> for UnifiedRequest {
	fn from(request: CancelRequest) -> Self {
		Self::Cancel(request)
	}
}
