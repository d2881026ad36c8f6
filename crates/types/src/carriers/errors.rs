//! Error types for carrier registration, settings, mapping and transport

use thiserror::Error;

use super::capabilities::Capability;
use super::metadata::CarrierId;
use crate::models::ConversionError;
use crate::wire::CodecError;

/// Structural problems in a carrier descriptor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataValidationError {
	#[error("Invalid carrier ID: {carrier_id}")]
	InvalidCarrierId { carrier_id: String },

	#[error("Invalid version format: {version}")]
	InvalidVersion { version: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },

	#[error("Carrier {carrier_id} declares no capabilities")]
	NoCapabilities { carrier_id: String },

	#[error("Invalid settings schema: {reason}")]
	InvalidSchema { reason: String },
}

/// What is wrong with one settings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
	Missing,
	Malformed { expected: String },
	Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
	pub field: String,
	pub issue: FieldIssue,
}

impl FieldProblem {
	pub fn missing(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			issue: FieldIssue::Missing,
		}
	}

	pub fn malformed(field: impl Into<String>, expected: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			issue: FieldIssue::Malformed {
				expected: expected.into(),
			},
		}
	}

	pub fn unrecognized(field: impl Into<String>) -> Self {
		Self {
			field: field.into(),
			issue: FieldIssue::Unrecognized,
		}
	}
}

impl std::fmt::Display for FieldProblem {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.issue {
			FieldIssue::Missing => write!(f, "{} is missing", self.field),
			FieldIssue::Malformed { expected } => {
				write!(f, "{} is malformed (expected {})", self.field, expected)
			},
			FieldIssue::Unrecognized => write!(f, "{} is not recognized", self.field),
		}
	}
}

/// Settings for a carrier account failed validation
///
/// Lists every problem found, not only the first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid settings for carrier {carrier_id}: {}", describe(.problems))]
pub struct InvalidSettingsError {
	pub carrier_id: CarrierId,
	pub problems: Vec<FieldProblem>,
}

impl InvalidSettingsError {
	pub fn new(carrier_id: CarrierId, problems: Vec<FieldProblem>) -> Self {
		Self {
			carrier_id,
			problems,
		}
	}

	pub fn single(carrier_id: CarrierId, problem: FieldProblem) -> Self {
		Self::new(carrier_id, vec![problem])
	}

	pub fn mentions(&self, field: &str) -> bool {
		self.problems.iter().any(|p| p.field == field)
	}
}

fn describe(problems: &[FieldProblem]) -> String {
	problems
		.iter()
		.map(ToString::to_string)
		.collect::<Vec<_>>()
		.join("; ")
}

/// Registry and account resolution failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
	#[error("Carrier already registered: {carrier_id}")]
	DuplicateCarrier { carrier_id: CarrierId },

	#[error("Unknown carrier: {carrier_id}")]
	UnknownCarrier { carrier_id: CarrierId },

	#[error(transparent)]
	InvalidSettings(#[from] InvalidSettingsError),

	#[error("Invalid metadata for carrier {carrier_id}: {source}")]
	InvalidMetadata {
		carrier_id: CarrierId,
		#[source]
		source: MetadataValidationError,
	},
}

/// Failures raised by mappers and adapter factories
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("Unsupported operation: {operation} for carrier {carrier_id}")]
	UnsupportedOperation {
		operation: Capability,
		carrier_id: CarrierId,
	},

	#[error(transparent)]
	InvalidSettings(#[from] InvalidSettingsError),

	#[error("Cannot map request for carrier {carrier_id}: {reason}")]
	Mapping { carrier_id: CarrierId, reason: String },

	#[error("Unit conversion failed: {0}")]
	Conversion(#[from] ConversionError),

	#[error("Codec error: {0}")]
	Codec(#[from] CodecError),

	#[error("HTTP client initialization failed: {0}")]
	Client(String),
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// Failures while exchanging bytes with a carrier endpoint
///
/// Distinct from business errors the carrier reports inside a response body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
	#[error("Connection to {url} failed: {reason}")]
	Connect { url: String, reason: String },

	#[error("Request to {url} timed out after {timeout_ms}ms")]
	Timeout { url: String, timeout_ms: u64 },

	#[error("HTTP {status_code}: {reason}")]
	HttpStatus { status_code: u16, reason: String },

	#[error("Request failed: {0}")]
	Request(String),

	#[error("Proxy for carrier {proxy} refused a request built for carrier {request}")]
	CarrierMismatch { proxy: CarrierId, request: CarrierId },

	#[error("Failed to encode request: {0}")]
	Encode(#[from] CodecError),
}

impl TransportError {
	/// Extract HTTP status code from the error if available
	pub fn status_code(&self) -> Option<u16> {
		match self {
			Self::HttpStatus { status_code, .. } => Some(*status_code),
			_ => None,
		}
	}

	/// Create an HTTP failure error from response status with default reason
	pub fn from_http_failure(status_code: u16) -> Self {
		let reason = match status_code {
			400 => "Bad Request".to_string(),
			401 => "Unauthorized".to_string(),
			403 => "Forbidden".to_string(),
			404 => "Not Found".to_string(),
			408 => "Request Timeout".to_string(),
			429 => "Too Many Requests".to_string(),
			500 => "Internal Server Error".to_string(),
			502 => "Bad Gateway".to_string(),
			503 => "Service Unavailable".to_string(),
			504 => "Gateway Timeout".to_string(),
			_ => format!("HTTP Error {}", status_code),
		};

		Self::HttpStatus {
			status_code,
			reason,
		}
	}

	/// Whether the same request may succeed if sent again
	pub fn is_transient(&self) -> bool {
		match self {
			Self::Connect { .. } | Self::Timeout { .. } => true,
			Self::HttpStatus { status_code, .. } => {
				matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
			},
			Self::Request(_) | Self::CarrierMismatch { .. } | Self::Encode(_) => false,
		}
	}
}
