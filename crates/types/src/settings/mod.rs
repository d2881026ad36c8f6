//! Carrier accounts and the validated settings built from them

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::carriers::metadata::is_http_url;
use crate::carriers::{CarrierId, FieldProblem, InvalidSettingsError, Metadata, SettingSpec};
use crate::models::SecretString;

/// Which carrier environment an account talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
	#[default]
	Sandbox,
	Production,
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sandbox => f.write_str("sandbox"),
			Self::Production => f.write_str("production"),
		}
	}
}

/// A caller-supplied carrier account, not yet validated
///
/// Option values are held as secrets regardless of the schema; the schema
/// decides which ones may be exposed once the settings are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierAccount {
	pub carrier_id: CarrierId,
	pub account_id: String,
	#[serde(default)]
	pub environment: Environment,
	/// Overrides the carrier's default endpoint for the environment
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub endpoint: Option<String>,
	/// Per-account timeout; clamped to the batch deadline at dispatch
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout_ms: Option<u64>,
	#[serde(default)]
	pub options: BTreeMap<String, SecretString>,
}

impl CarrierAccount {
	pub fn new(carrier_id: impl Into<CarrierId>, account_id: impl Into<String>) -> Self {
		Self {
			carrier_id: carrier_id.into(),
			account_id: account_id.into(),
			environment: Environment::Sandbox,
			endpoint: None,
			timeout_ms: None,
			options: BTreeMap::new(),
		}
	}

	pub fn with_option(mut self, name: impl Into<String>, value: impl Into<SecretString>) -> Self {
		self.options.insert(name.into(), value.into());
		self
	}

	pub fn with_environment(mut self, environment: Environment) -> Self {
		self.environment = environment;
		self
	}

	pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = Some(endpoint.into());
		self
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = Some(timeout_ms);
		self
	}
}

/// Validated, immutable settings for one carrier account
///
/// Only exists once every schema check passed. Non-secret options can be read
/// in the clear, secret ones only through `SecretString`.
#[derive(Debug, Clone, PartialEq)]
pub struct CarrierSettings {
	carrier_id: CarrierId,
	account_id: String,
	environment: Environment,
	endpoint: Option<String>,
	timeout_ms: Option<u64>,
	values: BTreeMap<String, String>,
	secrets: BTreeMap<String, SecretString>,
}

impl CarrierSettings {
	/// Validate an account against a carrier's descriptor
	pub fn new(metadata: &Metadata, account: &CarrierAccount) -> Result<Self, InvalidSettingsError> {
		Self::from_schema(&metadata.id, &metadata.settings_schema, account)
	}

	pub fn from_schema(
		carrier_id: &CarrierId,
		schema: &[SettingSpec],
		account: &CarrierAccount,
	) -> Result<Self, InvalidSettingsError> {
		let mut problems = Vec::new();

		if &account.carrier_id != carrier_id {
			problems.push(FieldProblem::malformed(
				"carrier_id",
				format!("'{}'", carrier_id),
			));
		}
		if !is_valid_account_id(&account.account_id) {
			problems.push(FieldProblem::malformed(
				"account_id",
				"letters, digits, '_', '-' or '.'",
			));
		}
		if let Some(endpoint) = &account.endpoint {
			if !is_http_url(endpoint) {
				problems.push(FieldProblem::malformed("endpoint", "an http(s) URL"));
			}
		}
		if account.timeout_ms == Some(0) {
			problems.push(FieldProblem::malformed("timeout_ms", "a positive duration"));
		}

		let mut values = BTreeMap::new();
		let mut secrets = BTreeMap::new();
		for spec in schema {
			match account.options.get(spec.name) {
				None => {
					if spec.required {
						problems.push(FieldProblem::missing(spec.name));
					}
				},
				Some(value) if value.expose_secret().trim().is_empty() => {
					if spec.required {
						problems.push(FieldProblem::missing(spec.name));
					}
				},
				Some(value) if !spec.kind.accepts(value.expose_secret()) => {
					problems.push(FieldProblem::malformed(spec.name, spec.kind.describe()));
				},
				Some(value) => {
					if spec.secret {
						secrets.insert(spec.name.to_string(), value.clone());
					} else {
						values.insert(
							spec.name.to_string(),
							value.expose_secret().trim().to_string(),
						);
					}
				},
			}
		}

		for name in account.options.keys() {
			if !schema.iter().any(|spec| spec.name == name) {
				problems.push(FieldProblem::unrecognized(name.as_str()));
			}
		}

		if !problems.is_empty() {
			return Err(InvalidSettingsError::new(carrier_id.clone(), problems));
		}

		Ok(Self {
			carrier_id: carrier_id.clone(),
			account_id: account.account_id.clone(),
			environment: account.environment,
			endpoint: account.endpoint.clone(),
			timeout_ms: account.timeout_ms,
			values,
			secrets,
		})
	}

	pub fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	pub fn account_id(&self) -> &str {
		&self.account_id
	}

	pub fn environment(&self) -> Environment {
		self.environment
	}

	pub fn is_sandbox(&self) -> bool {
		self.environment == Environment::Sandbox
	}

	pub fn timeout_ms(&self) -> Option<u64> {
		self.timeout_ms
	}

	/// The endpoint override if set, otherwise the default for the environment
	pub fn server_url(&self, sandbox: &str, production: &str) -> String {
		if let Some(endpoint) = &self.endpoint {
			return endpoint.trim_end_matches('/').to_string();
		}
		match self.environment {
			Environment::Sandbox => sandbox.to_string(),
			Environment::Production => production.to_string(),
		}
	}

	pub fn value(&self, name: &str) -> Option<&str> {
		self.values.get(name).map(String::as_str)
	}

	pub fn secret(&self, name: &str) -> Option<&SecretString> {
		self.secrets.get(name)
	}

	/// A non-secret value the adapter cannot work without
	pub fn require_value(&self, name: &str) -> Result<&str, InvalidSettingsError> {
		self.value(name).ok_or_else(|| {
			InvalidSettingsError::single(self.carrier_id.clone(), FieldProblem::missing(name))
		})
	}

	pub fn require_secret(&self, name: &str) -> Result<&SecretString, InvalidSettingsError> {
		self.secret(name).ok_or_else(|| {
			InvalidSettingsError::single(self.carrier_id.clone(), FieldProblem::missing(name))
		})
	}

	pub fn flag(&self, name: &str) -> bool {
		self.value(name) == Some("true")
	}
}

fn is_valid_account_id(id: &str) -> bool {
	!id.is_empty()
		&& id
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
