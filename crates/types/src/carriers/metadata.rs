//! Static carrier descriptors

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use super::capabilities::CapabilitySet;
use super::errors::MetadataValidationError;
use super::traits::AdapterFactory;
use crate::settings::CarrierAccount;

/// Unique identifier of a carrier integration, e.g. `dicom` or `fedex`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierId(String);

impl CarrierId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Ids are lowercase ASCII letters, digits, `_` and `-`, starting with a letter
	pub fn is_well_formed(&self) -> bool {
		let mut chars = self.0.chars();
		match chars.next() {
			Some(first) if first.is_ascii_lowercase() => chars
				.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'),
			_ => false,
		}
	}
}

impl fmt::Display for CarrierId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for CarrierId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl From<String> for CarrierId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

impl AsRef<str> for CarrierId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl PartialEq<str> for CarrierId {
	fn eq(&self, other: &str) -> bool {
		self.0 == other
	}
}

impl PartialEq<&str> for CarrierId {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

/// Expected shape of a settings value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKind {
	/// Any non-blank text
	Text,
	/// ASCII digits only (account and meter numbers)
	Digits,
	Email,
	/// Absolute http(s) URL
	Url,
	/// `true` or `false`
	Flag,
}

impl SettingKind {
	pub fn accepts(self, value: &str) -> bool {
		let value = value.trim();
		if value.is_empty() {
			return false;
		}
		match self {
			Self::Text => true,
			Self::Digits => value.chars().all(|c| c.is_ascii_digit()),
			Self::Email => match value.split_once('@') {
				Some((local, domain)) => {
					!local.is_empty() && domain.contains('.') && !domain.starts_with('.')
				},
				None => false,
			},
			Self::Url => is_http_url(value),
			Self::Flag => matches!(value, "true" | "false"),
		}
	}

	pub fn describe(self) -> &'static str {
		match self {
			Self::Text => "non-empty text",
			Self::Digits => "digits only",
			Self::Email => "an email address",
			Self::Url => "an http(s) URL",
			Self::Flag => "true or false",
		}
	}
}

pub(crate) fn is_http_url(value: &str) -> bool {
	match Url::parse(value) {
		Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
		Err(_) => false,
	}
}

/// One recognized option in a carrier's settings schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettingSpec {
	pub name: &'static str,
	pub required: bool,
	/// Secret values are kept as `SecretString` and never logged
	pub secret: bool,
	pub kind: SettingKind,
}

impl SettingSpec {
	pub const fn required(name: &'static str, kind: SettingKind) -> Self {
		Self {
			name,
			required: true,
			secret: false,
			kind,
		}
	}

	pub const fn optional(name: &'static str, kind: SettingKind) -> Self {
		Self {
			name,
			required: false,
			secret: false,
			kind,
		}
	}

	pub const fn secret(mut self) -> Self {
		self.secret = true;
		self
	}
}

/// Static descriptor of a carrier integration
///
/// Registered once at startup; the registry hands out clones. The factory is
/// shared, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct Metadata {
	pub id: CarrierId,
	pub label: String,
	/// Semantic version of the adapter (`MAJOR.MINOR.PATCH`)
	pub version: String,
	pub capabilities: CapabilitySet,
	/// Whether the carrier resells several underlying carriers
	pub is_aggregator: bool,
	pub settings_schema: Vec<SettingSpec>,
	/// Account used to prove the adapter can be instantiated at startup
	pub sandbox_account: Option<CarrierAccount>,
	pub factory: Arc<dyn AdapterFactory>,
}

impl Metadata {
	pub fn new(
		id: impl Into<CarrierId>,
		label: impl Into<String>,
		version: impl Into<String>,
		factory: Arc<dyn AdapterFactory>,
	) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			version: version.into(),
			capabilities: CapabilitySet::none(),
			is_aggregator: false,
			settings_schema: Vec::new(),
			sandbox_account: None,
			factory,
		}
	}

	pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
		self.capabilities = capabilities;
		self
	}

	pub fn with_schema(mut self, schema: Vec<SettingSpec>) -> Self {
		self.settings_schema = schema;
		self
	}

	pub fn with_sandbox_account(mut self, account: CarrierAccount) -> Self {
		self.sandbox_account = Some(account);
		self
	}

	pub fn as_aggregator(mut self) -> Self {
		self.is_aggregator = true;
		self
	}

	pub fn spec(&self, name: &str) -> Option<&SettingSpec> {
		self.settings_schema.iter().find(|spec| spec.name == name)
	}

	/// Structural checks run before a descriptor enters the registry
	pub fn validate(&self) -> Result<(), MetadataValidationError> {
		if self.id.as_str().is_empty() {
			return Err(MetadataValidationError::MissingRequiredField {
				field: "id".to_string(),
			});
		}
		if !self.id.is_well_formed() {
			return Err(MetadataValidationError::InvalidCarrierId {
				carrier_id: self.id.to_string(),
			});
		}
		if self.label.trim().is_empty() {
			return Err(MetadataValidationError::MissingRequiredField {
				field: "label".to_string(),
			});
		}
		if self.version.trim().is_empty() {
			return Err(MetadataValidationError::MissingRequiredField {
				field: "version".to_string(),
			});
		}
		if !is_valid_semver(&self.version) {
			return Err(MetadataValidationError::InvalidVersion {
				version: self.version.clone(),
			});
		}
		if self.capabilities.is_empty() {
			return Err(MetadataValidationError::NoCapabilities {
				carrier_id: self.id.to_string(),
			});
		}

		let mut seen = std::collections::HashSet::new();
		for spec in &self.settings_schema {
			if spec.name.trim().is_empty() {
				return Err(MetadataValidationError::InvalidSchema {
					reason: "setting with an empty name".to_string(),
				});
			}
			if !seen.insert(spec.name) {
				return Err(MetadataValidationError::InvalidSchema {
					reason: format!("setting '{}' declared twice", spec.name),
				});
			}
		}

		Ok(())
	}
}

fn is_valid_semver(version: &str) -> bool {
	let core = version.split(['-', '+']).next().unwrap_or_default();
	let parts: Vec<&str> = core.split('.').collect();
	parts.len() == 3
		&& parts
			.iter()
			.all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}
