//! One carrier account's request pipeline
//!
//! A [`Connection`] binds a carrier's gateway to one validated account and
//! runs map → send → parse, folding every failure into a `CarrierError` for
//! that account.

use std::sync::Arc;

use shipx_adapters::AdapterRegistry;
use shipx_types::{
	Capability, CapabilitySet, CarrierAccount, CarrierError, CarrierRef, CarrierSettings, Gateway,
	Metadata, ParsedResponse, UnifiedRequest,
};
use tracing::debug;

/// A carrier account ready to serve requests
#[derive(Debug, Clone)]
pub struct Connection {
	target: CarrierRef,
	capabilities: CapabilitySet,
	timeout_ms: Option<u64>,
	gateway: Gateway,
}

impl Connection {
	/// Resolve the account's carrier, validate its settings and build the gateway
	pub fn establish(
		registry: &AdapterRegistry,
		account: &CarrierAccount,
	) -> Result<Self, CarrierError> {
		Self::establish_for(registry, account, None)
	}

	/// Like [`Connection::establish`], refusing early when the carrier lacks
	/// `capability` so no settings are built for a request it cannot serve
	pub(crate) fn establish_for(
		registry: &AdapterRegistry,
		account: &CarrierAccount,
		capability: Option<Capability>,
	) -> Result<Self, CarrierError> {
		let target = CarrierRef::new(account.carrier_id.clone(), account.account_id.clone());

		let metadata = registry
			.lookup(account.carrier_id.as_str())
			.map_err(|e| target.configuration_error(&e))?;

		if let Some(capability) = capability {
			if !metadata.capabilities.supports(capability) {
				return Err(target.unsupported(capability));
			}
		}

		let settings = CarrierSettings::new(metadata, account)
			.map_err(|e| target.configuration_error(&e.into()))?;
		Self::from_settings(metadata, Arc::new(settings))
	}

	/// Build a connection from settings validated elsewhere
	pub fn from_settings(
		metadata: &Metadata,
		settings: Arc<CarrierSettings>,
	) -> Result<Self, CarrierError> {
		let target = CarrierRef::new(settings.carrier_id().clone(), settings.account_id());
		let gateway = metadata
			.factory
			.create_gateway(settings.clone())
			.map_err(|e| target.adapter_error(&e))?;

		Ok(Self {
			target,
			capabilities: metadata.capabilities,
			timeout_ms: settings.timeout_ms(),
			gateway,
		})
	}

	/// Wrap a prebuilt gateway, e.g. a test double
	pub fn from_gateway(target: CarrierRef, capabilities: CapabilitySet, gateway: Gateway) -> Self {
		Self {
			target,
			capabilities,
			timeout_ms: None,
			gateway,
		}
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = Some(timeout_ms);
		self
	}

	pub fn target(&self) -> &CarrierRef {
		&self.target
	}

	pub fn capabilities(&self) -> CapabilitySet {
		self.capabilities
	}

	/// Account-level timeout override, if any
	pub fn timeout_ms(&self) -> Option<u64> {
		self.timeout_ms
	}

	/// Run one request through the carrier
	///
	/// Never fails: unsupported operations, mapping problems and transport
	/// failures come back as errors in the parsed response.
	pub async fn run(&self, request: &UnifiedRequest) -> ParsedResponse {
		let capability = request.capability();
		if !self.capabilities.supports(capability) {
			debug!(
				"Carrier {} does not support {}, skipping proxy",
				self.target.carrier_id, capability
			);
			return ParsedResponse::from_error(self.target.unsupported(capability));
		}

		let carrier_request = match self.gateway.mapper.to_carrier_request(request) {
			Ok(carrier_request) => carrier_request,
			Err(e) => return ParsedResponse::from_error(self.target.adapter_error(&e)),
		};

		debug!(
			"Sending {} request to {}/{}",
			capability, self.target.carrier_id, self.target.account_id
		);
		let response = match self.gateway.proxy.send(carrier_request).await {
			Ok(response) => response,
			Err(e) => return ParsedResponse::from_error(self.target.transport_error(&e)),
		};

		debug!(
			"{}/{} answered with status {}",
			self.target.carrier_id, self.target.account_id, response.status
		);
		self.gateway.mapper.from_carrier_response(response)
	}
}
