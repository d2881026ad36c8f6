//! Contracts every carrier integration implements

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::{AdapterResult, TransportError};
use super::metadata::CarrierId;
use crate::requests::UnifiedRequest;
use crate::results::ParsedResponse;
use crate::settings::CarrierSettings;
use crate::wire::{CarrierRequest, CarrierResponse};

/// Translates between the unified model and one carrier's wire types
///
/// Mappers are pure: no I/O, and the same input always yields the same
/// request. Settings are bound when the mapper is built.
pub trait Mapper: Send + Sync + Debug {
	fn carrier_id(&self) -> &CarrierId;

	/// Build the carrier-native request for a unified request.
	///
	/// Variants outside the carrier's capability set fail with
	/// `AdapterError::UnsupportedOperation`.
	fn to_carrier_request(&self, request: &UnifiedRequest) -> AdapterResult<CarrierRequest>;

	/// Normalize a raw carrier response.
	///
	/// Never fails: undecodable bodies become a `PARSE_ERROR` entry and a
	/// response may carry results and errors at the same time.
	fn from_carrier_response(&self, response: CarrierResponse) -> ParsedResponse;
}

/// Executes carrier requests over the network
#[async_trait]
pub trait Proxy: Send + Sync + Debug {
	fn carrier_id(&self) -> &CarrierId;

	/// Send a request built by this carrier's mapper and return the raw
	/// response. Requests built for another carrier are refused with
	/// `TransportError::CarrierMismatch`.
	async fn send(&self, request: CarrierRequest) -> Result<CarrierResponse, TransportError>;

	/// Refuse requests that did not originate from the paired mapper
	fn ensure_origin(&self, request: &CarrierRequest) -> Result<(), TransportError> {
		if request.carrier_id() != self.carrier_id() {
			return Err(TransportError::CarrierMismatch {
				proxy: self.carrier_id().clone(),
				request: request.carrier_id().clone(),
			});
		}
		Ok(())
	}
}

/// A mapper and proxy bound to one validated carrier account
#[derive(Debug, Clone)]
pub struct Gateway {
	pub mapper: Arc<dyn Mapper>,
	pub proxy: Arc<dyn Proxy>,
}

impl Gateway {
	pub fn new(mapper: Arc<dyn Mapper>, proxy: Arc<dyn Proxy>) -> Self {
		Self { mapper, proxy }
	}
}

/// Builds the mapper/proxy pair for a carrier from validated settings
pub trait AdapterFactory: Send + Sync + Debug {
	fn create_gateway(&self, settings: Arc<CarrierSettings>) -> AdapterResult<Gateway>;
}
