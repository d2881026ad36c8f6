//! Configuration settings structures

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shipx_types::{CarrierAccount, CarrierId, Environment};
use thiserror::Error;

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Settings {
	#[serde(default)]
	pub dispatch: DispatchSettings,
	#[serde(default)]
	pub logging: LoggingSettings,
	/// Carrier accounts keyed by a local name, e.g. `dicom_main`
	#[serde(default)]
	pub carriers: BTreeMap<String, AccountConfig>,
}

/// Timeouts and retries applied to every dispatch
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchSettings {
	/// Hard limit for one whole dispatch
	pub batch_deadline_ms: u64,
	/// Default limit per carrier account; must not exceed the batch deadline
	pub per_carrier_timeout_ms: u64,
	/// Limit for a single HTTP exchange with a carrier
	pub request_timeout_ms: u64,
	pub retry: RetrySettings,
}

impl Default for DispatchSettings {
	fn default() -> Self {
		Self {
			batch_deadline_ms: 30_000,
			per_carrier_timeout_ms: 20_000,
			request_timeout_ms: 15_000,
			retry: RetrySettings::default(),
		}
	}
}

/// Backoff for idempotent carrier calls (rating, tracking)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
	pub max_retries: u32,
	pub initial_delay_ms: u64,
	pub max_delay_ms: u64,
}

impl Default for RetrySettings {
	fn default() -> Self {
		Self {
			max_retries: 2,
			initial_delay_ms: 200,
			max_delay_ms: 2_000,
		}
	}
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Compact,
			structured: false,
		}
	}
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// One carrier account as written in the config file
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccountConfig {
	pub carrier_id: String,
	/// Defaults to the entry's key
	#[serde(default)]
	pub account_id: Option<String>,
	#[serde(default)]
	pub environment: Environment,
	#[serde(default)]
	pub endpoint: Option<String>,
	#[serde(default)]
	pub timeout_ms: Option<u64>,
	#[serde(default = "default_enabled")]
	pub enabled: bool,
	#[serde(default)]
	pub options: BTreeMap<String, ConfigurableValue>,
}

fn default_enabled() -> bool {
	true
}

impl AccountConfig {
	pub fn account_id<'a>(&'a self, name: &'a str) -> &'a str {
		self.account_id.as_deref().unwrap_or(name)
	}

	/// Resolve every option and build the domain account
	pub fn to_account(&self, name: &str) -> Result<CarrierAccount, ConfigurableValueError> {
		let mut account = CarrierAccount::new(self.carrier_id.as_str(), self.account_id(name))
			.with_environment(self.environment);
		if let Some(endpoint) = &self.endpoint {
			account = account.with_endpoint(endpoint.clone());
		}
		if let Some(timeout_ms) = self.timeout_ms {
			account = account.with_timeout_ms(timeout_ms);
		}
		for (option, value) in &self.options {
			account = account.with_option(option.clone(), value.resolve_secret()?);
		}
		Ok(account)
	}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
	#[error("{field} must be greater than zero")]
	ZeroTimeout { field: &'static str },

	#[error("{field} ({value_ms}ms) exceeds the batch deadline ({batch_deadline_ms}ms)")]
	ExceedsBatchDeadline {
		field: String,
		value_ms: u64,
		batch_deadline_ms: u64,
	},

	#[error("Carrier account '{name}' has an invalid carrier id '{carrier_id}'")]
	InvalidCarrierId { name: String, carrier_id: String },

	#[error("Carrier account {carrier_id}/{account_id} is configured more than once")]
	DuplicateAccount {
		carrier_id: String,
		account_id: String,
	},

	#[error("Carrier account '{name}' option '{option}': {source}")]
	UnresolvedOption {
		name: String,
		option: String,
		source: ConfigurableValueError,
	},
}

impl Settings {
	/// Check timeouts and account identities
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		let dispatch = &self.dispatch;
		for (field, value) in [
			("dispatch.batch_deadline_ms", dispatch.batch_deadline_ms),
			("dispatch.per_carrier_timeout_ms", dispatch.per_carrier_timeout_ms),
			("dispatch.request_timeout_ms", dispatch.request_timeout_ms),
		] {
			if value == 0 {
				return Err(ConfigValidationError::ZeroTimeout { field });
			}
		}
		if dispatch.per_carrier_timeout_ms > dispatch.batch_deadline_ms {
			return Err(ConfigValidationError::ExceedsBatchDeadline {
				field: "dispatch.per_carrier_timeout_ms".to_string(),
				value_ms: dispatch.per_carrier_timeout_ms,
				batch_deadline_ms: dispatch.batch_deadline_ms,
			});
		}

		let mut seen = BTreeSet::new();
		for (name, account) in &self.carriers {
			if !CarrierId::new(account.carrier_id.as_str()).is_well_formed() {
				return Err(ConfigValidationError::InvalidCarrierId {
					name: name.clone(),
					carrier_id: account.carrier_id.clone(),
				});
			}
			if account.timeout_ms == Some(0) {
				return Err(ConfigValidationError::ZeroTimeout {
					field: "carriers.*.timeout_ms",
				});
			}
			if let Some(timeout_ms) = account.timeout_ms {
				if timeout_ms > dispatch.batch_deadline_ms {
					return Err(ConfigValidationError::ExceedsBatchDeadline {
						field: format!("carriers.{}.timeout_ms", name),
						value_ms: timeout_ms,
						batch_deadline_ms: dispatch.batch_deadline_ms,
					});
				}
			}
			let key = (account.carrier_id.clone(), account.account_id(name).to_string());
			if !seen.insert(key) {
				return Err(ConfigValidationError::DuplicateAccount {
					carrier_id: account.carrier_id.clone(),
					account_id: account.account_id(name).to_string(),
				});
			}
		}
		Ok(())
	}

	pub fn enabled_carriers(&self) -> impl Iterator<Item = (&String, &AccountConfig)> {
		self.carriers.iter().filter(|(_, account)| account.enabled)
	}

	/// Domain accounts for every enabled entry, with options resolved
	pub fn carrier_accounts(&self) -> Result<Vec<CarrierAccount>, ConfigValidationError> {
		self.enabled_carriers()
			.map(|(name, config)| {
				config.to_account(name).map_err(|source| {
					let option = match &source {
						ConfigurableValueError::EnvironmentVariableNotFound(var) => config
							.options
							.iter()
							.find(|(_, value)| &value.value == var)
							.map(|(option, _)| option.clone())
							.unwrap_or_default(),
					};
					ConfigValidationError::UnresolvedOption {
						name: name.clone(),
						option,
						source,
					}
				})
			})
			.collect()
	}
}
