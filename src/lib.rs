//! shipx
//!
//! One request shape for many shipping carriers. The facade wires the
//! configured accounts, the adapter registry and the dispatcher together:
//!
//! ```no_run
//! use shipx::{ShipxBuilder, UnifiedRequest};
//!
//! # async fn run(request: UnifiedRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let shipx = ShipxBuilder::new().build()?;
//! let outcome = shipx.dispatch_to(request, &["dicom", "fedex"]).await?;
//! println!("{} quote(s)", outcome.results.len());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub use shipx_types::{
	chrono, codes, rust_decimal, serde_json, Address, Capability, CapabilitySet, CarrierAccount,
	CarrierError, CarrierId, CarrierRef, DispatchResult, Environment, Metadata, Parcel,
	ResultDetails, UnifiedRequest, UnifiedResult, Weight, WeightUnit,
};

pub use shipx_adapters::{AdapterOptions, AdapterRegistry, Registration, RetryPolicy};
pub use shipx_config::{load_config, ConfigLoadError, ConfigValidationError, LogFormat, Settings};
pub use shipx_service::{Connection, DispatchConfig, DispatchError, DispatchTarget, Dispatcher};

pub mod models {
	pub use shipx_types::*;
}

pub mod adapters {
	pub use shipx_adapters::*;
}

pub mod config {
	pub use shipx_config::*;
}

pub mod service {
	pub use shipx_service::*;
}

pub mod mocks;

pub use async_trait;

#[derive(Debug, Error)]
pub enum ShipxError {
	#[error(transparent)]
	Load(#[from] ConfigLoadError),

	#[error(transparent)]
	Configuration(#[from] ConfigValidationError),

	#[error("Failed to initialize logging: {0}")]
	Tracing(String),
}

/// Builder for a configured [`Shipx`] instance
pub struct ShipxBuilder {
	settings: Option<Settings>,
	options: Option<AdapterOptions>,
	builtin_adapters: bool,
	registrations: Vec<Registration>,
	adapters: Vec<Metadata>,
	accounts: Vec<CarrierAccount>,
}

impl Default for ShipxBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ShipxBuilder {
	pub fn new() -> Self {
		Self {
			settings: None,
			options: None,
			builtin_adapters: true,
			registrations: Vec::new(),
			adapters: Vec::new(),
			accounts: Vec::new(),
		}
	}

	/// Load settings from `config/config.*` and `SHIPX__` environment variables
	pub fn from_config() -> Result<Self, ShipxError> {
		Ok(Self::new().with_settings(load_config()?))
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Transport options for every adapter; derived from the settings if unset
	pub fn with_options(mut self, options: AdapterOptions) -> Self {
		self.options = Some(options);
		self
	}

	/// Register an additional adapter entrypoint
	pub fn with_adapter(mut self, registration: Registration) -> Self {
		self.registrations.push(registration);
		self
	}

	/// Register a ready-made descriptor
	pub fn with_metadata(mut self, metadata: Metadata) -> Self {
		self.adapters.push(metadata);
		self
	}

	/// Skip the carriers shipped with shipx
	pub fn without_builtin_adapters(mut self) -> Self {
		self.builtin_adapters = false;
		self
	}

	/// Add an account on top of those in the settings
	pub fn with_account(mut self, account: CarrierAccount) -> Self {
		self.accounts.push(account);
		self
	}

	/// Initialize tracing from the logging settings; `RUST_LOG` wins over the
	/// configured level
	pub fn init_tracing(&self) -> Result<(), ShipxError> {
		let default_settings = Settings::default();
		let logging = &self.settings.as_ref().unwrap_or(&default_settings).logging;

		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

		// Logs go to stderr so stdout stays machine-readable
		let result = match logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt()
					.json()
					.with_writer(std::io::stderr)
					.with_env_filter(env_filter);
				if logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_writer(std::io::stderr)
					.with_env_filter(env_filter);
				if logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_writer(std::io::stderr)
					.with_env_filter(env_filter);
				if logging.structured {
					subscriber.with_target(true).with_thread_ids(true).try_init()
				} else {
					subscriber.try_init()
				}
			},
		};
		result.map_err(|e| ShipxError::Tracing(e.to_string()))?;

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			logging.level, logging.format, logging.structured
		);
		Ok(())
	}

	/// Validate the settings, discover adapters and resolve accounts
	pub fn build(self) -> Result<Shipx, ShipxError> {
		let settings = self.settings.unwrap_or_default();
		settings.validate()?;

		let options = self.options.unwrap_or_else(|| adapter_options(&settings));
		let mut entrypoints: Vec<Registration> = Vec::new();
		if self.builtin_adapters {
			entrypoints.extend_from_slice(shipx_adapters::BUILTIN_ADAPTERS);
		}
		entrypoints.extend(self.registrations);

		let mut registry = AdapterRegistry::discover(&entrypoints, &options);
		for metadata in self.adapters {
			registry.admit(metadata);
		}

		let mut accounts = settings.carrier_accounts()?;
		accounts.extend(self.accounts);
		for account in &accounts {
			if !registry.contains(account.carrier_id.as_str()) {
				warn!(
					"Account {}/{} refers to a carrier that is not registered",
					account.carrier_id, account.account_id
				);
			}
		}

		let config = DispatchConfig::new(
			Duration::from_millis(settings.dispatch.batch_deadline_ms),
			Duration::from_millis(settings.dispatch.per_carrier_timeout_ms),
		);
		Ok(Shipx {
			dispatcher: Dispatcher::new(Arc::new(registry), config),
			accounts,
		})
	}
}

fn adapter_options(settings: &Settings) -> AdapterOptions {
	let dispatch = &settings.dispatch;
	AdapterOptions::default()
		.with_retry(RetryPolicy::new(
			dispatch.retry.max_retries,
			Duration::from_millis(dispatch.retry.initial_delay_ms),
			Duration::from_millis(dispatch.retry.max_delay_ms),
		))
		.with_request_timeout(Duration::from_millis(dispatch.request_timeout_ms))
}

/// A ready-to-use registry, dispatcher and set of carrier accounts
#[derive(Debug, Clone)]
pub struct Shipx {
	dispatcher: Dispatcher,
	accounts: Vec<CarrierAccount>,
}

impl Shipx {
	pub fn registry(&self) -> &AdapterRegistry {
		self.dispatcher.registry()
	}

	pub fn dispatcher(&self) -> &Dispatcher {
		&self.dispatcher
	}

	pub fn accounts(&self) -> &[CarrierAccount] {
		&self.accounts
	}

	/// Send `request` to every configured account
	pub async fn dispatch(&self, request: UnifiedRequest) -> Result<DispatchResult, DispatchError> {
		let targets = self
			.accounts
			.iter()
			.cloned()
			.map(DispatchTarget::from)
			.collect();
		self.dispatcher.dispatch(request, targets).await
	}

	/// Send `request` to every configured account of the given carriers.
	///
	/// Repeated ids name the same carrier once. A carrier with no configured
	/// account yields an `UNKNOWN_CARRIER` or `INVALID_SETTINGS` error instead
	/// of a target.
	pub async fn dispatch_to(
		&self,
		request: UnifiedRequest,
		carrier_ids: &[&str],
	) -> Result<DispatchResult, DispatchError> {
		if carrier_ids.is_empty() {
			return Err(DispatchError::NoTargets);
		}
		request.validate()?;

		let mut targets = Vec::new();
		let mut unresolved = Vec::new();
		let carrier_ids: BTreeSet<&str> = carrier_ids.iter().copied().collect();
		for carrier_id in carrier_ids {
			let before = targets.len();
			targets.extend(
				self.accounts
					.iter()
					.filter(|account| account.carrier_id == carrier_id)
					.cloned()
					.map(DispatchTarget::from),
			);
			if targets.len() == before {
				unresolved.push(self.unresolved_error(carrier_id));
			}
		}

		let mut outcome = if targets.is_empty() {
			DispatchResult::default()
		} else {
			self.dispatcher.dispatch(request, targets).await?
		};
		for error in unresolved {
			outcome.push_error(error);
		}
		Ok(outcome)
	}

	/// Build a reusable connection for one account
	pub fn connect(&self, account: &CarrierAccount) -> Result<Connection, CarrierError> {
		Connection::establish(self.registry(), account)
	}

	fn unresolved_error(&self, carrier_id: &str) -> CarrierError {
		let target = CarrierRef::new(carrier_id, "");
		match self.registry().lookup(carrier_id) {
			Err(e) => target.configuration_error(&e),
			Ok(_) => target.error(
				codes::INVALID_SETTINGS,
				format!("No account configured for carrier {}", carrier_id),
			),
		}
	}
}
