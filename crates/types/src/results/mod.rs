//! Normalized carrier results and errors

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::carriers::{
	AdapterError, Capability, CarrierId, ConfigurationError, InvalidSettingsError, TransportError,
};
use crate::models::{Charge, Money};
use crate::requests::LabelType;

/// Normalized error codes. Carrier business codes are passed through as-is.
pub mod codes {
	pub const TRANSPORT: &str = "TRANSPORT";
	pub const TIMEOUT: &str = "TIMEOUT";
	pub const UNSUPPORTED_OPERATION: &str = "UNSUPPORTED_OPERATION";
	pub const INVALID_SETTINGS: &str = "INVALID_SETTINGS";
	pub const UNKNOWN_CARRIER: &str = "UNKNOWN_CARRIER";
	pub const PARSE_ERROR: &str = "PARSE_ERROR";
	pub const MAPPING_ERROR: &str = "MAPPING_ERROR";
	pub const INTERNAL: &str = "INTERNAL";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDetails {
	pub service: String,
	pub total_charge: Money,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub base_charge: Option<Money>,
	#[serde(default)]
	pub extra_charges: Vec<Charge>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub transit_days: Option<u32>,
	/// The underlying carrier when quoted through an aggregator
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub_carrier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentDetails {
	pub tracking_number: String,
	pub shipment_identifier: String,
	/// Base64-encoded label document
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	pub label_type: LabelType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupDetails {
	pub confirmation_number: String,
	pub pickup_date: NaiveDate,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pickup_charge: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
	pub date: NaiveDateTime,
	pub code: String,
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingDetails {
	pub tracking_number: String,
	pub delivered: bool,
	/// Most recent first
	pub events: Vec<TrackingEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDetails {
	pub operation: Capability,
	pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultDetails {
	Rate(RateDetails),
	Shipment(ShipmentDetails),
	Pickup(PickupDetails),
	Tracking(TrackingDetails),
	Confirmation(ConfirmationDetails),
}

/// A normalized success, traceable to one carrier account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedResult {
	pub carrier_id: CarrierId,
	pub account_id: String,
	pub details: ResultDetails,
}

/// A normalized failure, traceable to one carrier account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierError {
	pub carrier_id: CarrierId,
	pub account_id: String,
	pub code: String,
	pub message: String,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub details: BTreeMap<String, String>,
}

impl CarrierError {
	pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.details.insert(key.into(), value.into());
		self
	}
}

/// Identity of one dispatch target: a carrier and one of its accounts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CarrierRef {
	pub carrier_id: CarrierId,
	pub account_id: String,
}

impl CarrierRef {
	pub fn new(carrier_id: impl Into<CarrierId>, account_id: impl Into<String>) -> Self {
		Self {
			carrier_id: carrier_id.into(),
			account_id: account_id.into(),
		}
	}

	pub fn result(&self, details: ResultDetails) -> UnifiedResult {
		UnifiedResult {
			carrier_id: self.carrier_id.clone(),
			account_id: self.account_id.clone(),
			details,
		}
	}

	pub fn error(&self, code: impl Into<String>, message: impl Into<String>) -> CarrierError {
		CarrierError {
			carrier_id: self.carrier_id.clone(),
			account_id: self.account_id.clone(),
			code: code.into(),
			message: message.into(),
			details: BTreeMap::new(),
		}
	}

	pub fn timeout(&self, timeout_ms: u64) -> CarrierError {
		self.error(
			codes::TIMEOUT,
			format!("Carrier did not respond within {}ms", timeout_ms),
		)
		.with_detail("timeout_ms", timeout_ms.to_string())
	}

	pub fn transport_error(&self, error: &TransportError) -> CarrierError {
		let carrier_error = self.error(codes::TRANSPORT, error.to_string());
		match error.status_code() {
			Some(status) => carrier_error.with_detail("status_code", status.to_string()),
			None => carrier_error,
		}
	}

	pub fn adapter_error(&self, error: &AdapterError) -> CarrierError {
		match error {
			AdapterError::UnsupportedOperation { operation, .. } => self
				.error(codes::UNSUPPORTED_OPERATION, error.to_string())
				.with_detail("operation", operation.as_str()),
			AdapterError::InvalidSettings(invalid) => self.invalid_settings(invalid),
			AdapterError::Client(_) => self.error(codes::INTERNAL, error.to_string()),
			AdapterError::Mapping { .. } | AdapterError::Conversion(_) | AdapterError::Codec(_) => {
				self.error(codes::MAPPING_ERROR, error.to_string())
			},
		}
	}

	pub fn configuration_error(&self, error: &ConfigurationError) -> CarrierError {
		match error {
			ConfigurationError::UnknownCarrier { .. } => {
				self.error(codes::UNKNOWN_CARRIER, error.to_string())
			},
			ConfigurationError::InvalidSettings(invalid) => self.invalid_settings(invalid),
			ConfigurationError::DuplicateCarrier { .. }
			| ConfigurationError::InvalidMetadata { .. } => {
				self.error(codes::INTERNAL, error.to_string())
			},
		}
	}

	fn invalid_settings(&self, error: &InvalidSettingsError) -> CarrierError {
		let fields: Vec<&str> = error.problems.iter().map(|p| p.field.as_str()).collect();
		self.error(codes::INVALID_SETTINGS, error.to_string())
			.with_detail("fields", fields.join(","))
	}

	pub fn unsupported(&self, operation: Capability) -> CarrierError {
		self.error(
			codes::UNSUPPORTED_OPERATION,
			format!(
				"Carrier {} does not support {}",
				self.carrier_id, operation
			),
		)
		.with_detail("operation", operation.as_str())
	}

	pub fn parse_error(&self, reason: impl Into<String>) -> CarrierError {
		self.error(codes::PARSE_ERROR, reason)
	}
}

/// What a mapper extracted from one carrier response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
	pub results: Vec<UnifiedResult>,
	pub errors: Vec<CarrierError>,
}

impl ParsedResponse {
	pub fn new(results: Vec<UnifiedResult>, errors: Vec<CarrierError>) -> Self {
		Self { results, errors }
	}

	pub fn from_error(error: CarrierError) -> Self {
		Self {
			results: Vec::new(),
			errors: vec![error],
		}
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty() && self.errors.is_empty()
	}
}

/// Aggregated outcome of one dispatch across every target
///
/// Order reflects completion order; use [`DispatchResult::sorted`] to compare
/// two runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
	pub results: Vec<UnifiedResult>,
	pub errors: Vec<CarrierError>,
}

impl DispatchResult {
	pub fn extend(&mut self, parsed: ParsedResponse) {
		self.results.extend(parsed.results);
		self.errors.extend(parsed.errors);
	}

	pub fn push_error(&mut self, error: CarrierError) {
		self.errors.push(error);
	}

	/// Deterministic order: by carrier id, then account id, keeping each
	/// carrier's own ordering
	pub fn sorted(mut self) -> Self {
		self.results
			.sort_by(|a, b| (&a.carrier_id, &a.account_id).cmp(&(&b.carrier_id, &b.account_id)));
		self.errors.sort_by(|a, b| {
			(&a.carrier_id, &a.account_id, &a.code, &a.message).cmp(&(
				&b.carrier_id,
				&b.account_id,
				&b.code,
				&b.message,
			))
		});
		self
	}

	pub fn results_for(&self, carrier_id: &str) -> Vec<&UnifiedResult> {
		self.results
			.iter()
			.filter(|r| r.carrier_id == carrier_id)
			.collect()
	}

	pub fn errors_for(&self, carrier_id: &str) -> Vec<&CarrierError> {
		self.errors
			.iter()
			.filter(|e| e.carrier_id == carrier_id)
			.collect()
	}
}

impl From<ParsedResponse> for DispatchResult {
	fn from(parsed: ParsedResponse) -> Self {
		Self {
			results: parsed.results,
			errors: parsed.errors,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	fn rate(carrier: &str, account: &str, service: &str) -> UnifiedResult {
		CarrierRef::new(carrier, account).result(ResultDetails::Rate(RateDetails {
			service: service.to_string(),
			total_charge: Money::new(dec!(10.00), "CAD"),
			base_charge: None,
			extra_charges: vec![],
			transit_days: Some(2),
			sub_carrier: None,
		}))
	}

	#[test]
	fn test_sorted_ignores_completion_order() {
		let first = DispatchResult {
			results: vec![rate("fedex", "a", "GROUND"), rate("dicom", "a", "DOM.EP")],
			errors: vec![CarrierRef::new("ups", "a").timeout(100)],
		};
		let second = DispatchResult {
			results: vec![rate("dicom", "a", "DOM.EP"), rate("fedex", "a", "GROUND")],
			errors: vec![CarrierRef::new("ups", "a").timeout(100)],
		};
		assert_ne!(first, second);
		assert_eq!(first.sorted(), second.sorted());
	}

	#[test]
	fn test_sorted_keeps_per_carrier_order() {
		let result = DispatchResult {
			results: vec![rate("dicom", "a", "DOM.XP"), rate("dicom", "a", "DOM.EP")],
			errors: vec![],
		}
		.sorted();
		let services: Vec<_> = result
			.results
			.iter()
			.map(|r| match &r.details {
				ResultDetails::Rate(rate) => rate.service.as_str(),
				_ => "",
			})
			.collect();
		assert_eq!(services, vec!["DOM.XP", "DOM.EP"]);
	}

	#[test]
	fn test_error_normalization() {
		let target = CarrierRef::new("dicom", "main");

		let error = target.transport_error(&TransportError::from_http_failure(503));
		assert_eq!(error.code, codes::TRANSPORT);
		assert_eq!(error.details.get("status_code").map(String::as_str), Some("503"));

		let error = target.unsupported(Capability::Pickup);
		assert_eq!(error.code, codes::UNSUPPORTED_OPERATION);
		assert_eq!(error.carrier_id, "dicom");
		assert_eq!(error.account_id, "main");

		let error = target.configuration_error(&ConfigurationError::UnknownCarrier {
			carrier_id: CarrierId::new("dicom"),
		});
		assert_eq!(error.code, codes::UNKNOWN_CARRIER);
	}
}
