use async_trait::async_trait;
use shipx_types::{Capability, CarrierId, CarrierRequest, CarrierResponse, Proxy, TransportError};

use super::wire::{soap_envelope, RATE_NAMESPACE, TRACK_NAMESPACE};
use crate::proxy::{HttpProxy, Route};

/// Posts SOAP envelopes to the FedEx web services endpoint
#[derive(Debug, Clone)]
pub struct FedexProxy {
	http: HttpProxy,
}

impl FedexProxy {
	pub fn new(http: HttpProxy) -> Self {
		Self { http }
	}

	fn route(operation: Capability) -> Route {
		match operation {
			Capability::Tracking => Route::post("/track")
				.with_header("SOAPAction", format!("{}/track", TRACK_NAMESPACE)),
			// Only rating and tracking requests are ever mapped
			_ => Route::post("/rate").with_header("SOAPAction", format!("{}/getRates", RATE_NAMESPACE)),
		}
	}
}

#[async_trait]
impl Proxy for FedexProxy {
	fn carrier_id(&self) -> &CarrierId {
		self.http.carrier_id()
	}

	async fn send(&self, request: CarrierRequest) -> Result<CarrierResponse, TransportError> {
		self.ensure_origin(&request)?;
		let body = soap_envelope(&request.encode()?);
		self.http
			.execute(
				request.operation(),
				Self::route(request.operation()),
				request.format(),
				Some(body),
			)
			.await
	}
}
