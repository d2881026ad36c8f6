//! Catalog of carrier integrations
//!
//! Filled once at startup by calling each adapter's registration entrypoint,
//! then shared read-only behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use shipx_types::{
	Capability, CarrierId, CarrierSettings, ConfigurationError, Metadata,
};
use tracing::{debug, info, warn};

use crate::proxy::AdapterOptions;
use crate::{dicom, fedex};

/// A carrier's registration entrypoint
pub type Registration = fn(&AdapterOptions) -> Metadata;

/// Entrypoints of the carriers shipped with this crate, in discovery order
pub const BUILTIN_ADAPTERS: &[Registration] = &[dicom::metadata, fedex::metadata];

#[derive(Debug, Default)]
pub struct AdapterRegistry {
	entries: BTreeMap<CarrierId, Metadata>,
}

impl AdapterRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registry holding every built-in carrier that passes startup checks
	pub fn with_defaults() -> Self {
		Self::discover(BUILTIN_ADAPTERS, &AdapterOptions::default())
	}

	/// Call each entrypoint in order and keep the adapters that validate.
	///
	/// Malformed descriptors, duplicate ids and adapters that cannot be built
	/// from their sandbox account are logged and left out.
	pub fn discover(entrypoints: &[Registration], options: &AdapterOptions) -> Self {
		let mut registry = Self::new();
		for entrypoint in entrypoints {
			registry.admit(entrypoint(options));
		}

		info!(
			"Adapter registry ready with {} carrier(s): {}",
			registry.len(),
			registry
				.entries
				.keys()
				.map(CarrierId::as_str)
				.collect::<Vec<_>>()
				.join(", ")
		);
		registry
	}

	/// Register `metadata` if it validates and its sandbox account yields a
	/// gateway; otherwise log why and leave the registry unchanged.
	pub fn admit(&mut self, metadata: Metadata) -> bool {
		let carrier_id = metadata.id.clone();
		let outcome = check_sandbox(&metadata)
			.and_then(|()| self.register(metadata).map_err(|e| e.to_string()));
		match outcome {
			Ok(()) => true,
			Err(reason) => {
				warn!("Excluding carrier {} from registry: {}", carrier_id, reason);
				false
			},
		}
	}

	/// Add a descriptor. An existing entry with the same id is left untouched.
	pub fn register(&mut self, metadata: Metadata) -> Result<(), ConfigurationError> {
		metadata
			.validate()
			.map_err(|source| ConfigurationError::InvalidMetadata {
				carrier_id: metadata.id.clone(),
				source,
			})?;

		if self.entries.contains_key(&metadata.id) {
			return Err(ConfigurationError::DuplicateCarrier {
				carrier_id: metadata.id.clone(),
			});
		}

		debug!(
			"Registered carrier {} ({} v{}) with capabilities {}",
			metadata.id, metadata.label, metadata.version, metadata.capabilities
		);
		self.entries.insert(metadata.id.clone(), metadata);
		Ok(())
	}

	pub fn lookup(&self, carrier_id: &str) -> Result<&Metadata, ConfigurationError> {
		self.entries
			.get(&CarrierId::new(carrier_id))
			.ok_or_else(|| ConfigurationError::UnknownCarrier {
				carrier_id: CarrierId::new(carrier_id),
			})
	}

	pub fn contains(&self, carrier_id: &str) -> bool {
		self.entries.contains_key(&CarrierId::new(carrier_id))
	}

	/// Carriers supporting `capability`, ordered by id
	pub fn list_by_capability(&self, capability: Capability) -> Vec<&Metadata> {
		self.entries
			.values()
			.filter(|m| m.capabilities.supports(capability))
			.collect()
	}

	pub fn list_aggregators(&self) -> Vec<&Metadata> {
		self.entries.values().filter(|m| m.is_aggregator).collect()
	}

	pub fn list_all(&self) -> Vec<&Metadata> {
		self.entries.values().collect()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn into_shared(self) -> Arc<Self> {
		Arc::new(self)
	}
}

/// Prove the adapter can be built from its own sandbox account
fn check_sandbox(metadata: &Metadata) -> Result<(), String> {
	metadata.validate().map_err(|e| e.to_string())?;
	let Some(account) = &metadata.sandbox_account else {
		return Ok(());
	};
	let settings = CarrierSettings::new(metadata, account).map_err(|e| e.to_string())?;
	metadata
		.factory
		.create_gateway(Arc::new(settings))
		.map(|_| ())
		.map_err(|e| format!("sandbox gateway failed: {}", e))
}
