use async_trait::async_trait;
use shipx_types::{Capability, CarrierId, CarrierRequest, CarrierResponse, Proxy, TransportError};

use crate::proxy::{HttpProxy, Route};

#[derive(Debug, Clone)]
pub struct DicomProxy {
	http: HttpProxy,
}

impl DicomProxy {
	pub fn new(http: HttpProxy) -> Self {
		Self { http }
	}

	fn route(operation: Capability) -> Route {
		match operation {
			Capability::Rating => Route::post("/v1/rate"),
			Capability::Shipping => Route::post("/v1/shipment"),
			Capability::Pickup => Route::post("/v1/pickup"),
			Capability::Tracking => Route::post("/v1/tracking"),
			Capability::Cancel => Route::post("/v1/shipment/cancel"),
		}
	}
}

#[async_trait]
impl Proxy for DicomProxy {
	fn carrier_id(&self) -> &CarrierId {
		self.http.carrier_id()
	}

	async fn send(&self, request: CarrierRequest) -> Result<CarrierResponse, TransportError> {
		self.ensure_origin(&request)?;
		let body = request.encode()?;
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
