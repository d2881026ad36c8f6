//! Shared HTTP execution for carrier proxies
//!
//! Carrier proxies decide the route and body for each operation; `HttpProxy`
//! applies auth, timeouts and retries and classifies the response status.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use shipx_types::{
	AdapterError, AdapterResult, Capability, CarrierId, CarrierResponse, CarrierSettings,
	TransportError, WireFormat,
};
use tracing::debug;
use url::Url;

use crate::client_cache::{ClientCache, ClientKey, PoolOptions};
use crate::http::{HttpAuth, HttpMethod, HttpRequest, HttpTransport, ReqwestTransport};
use crate::retry::{retry_with_backoff, RetryPolicy};

/// Transport settings handed to every adapter at registration
#[derive(Clone)]
pub struct AdapterOptions {
	pub retry: RetryPolicy,
	pub request_timeout: Duration,
	pub pool: PoolOptions,
	/// Replaces the pooled reqwest transport for every gateway built
	pub transport: Option<Arc<dyn HttpTransport>>,
}

impl Default for AdapterOptions {
	fn default() -> Self {
		Self {
			retry: RetryPolicy::default(),
			request_timeout: Duration::from_secs(30),
			pool: PoolOptions::default(),
			transport: None,
		}
	}
}

impl fmt::Debug for AdapterOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdapterOptions")
			.field("retry", &self.retry)
			.field("request_timeout", &self.request_timeout)
			.field("pool", &self.pool)
			.field("custom_transport", &self.transport.is_some())
			.finish()
	}
}

impl AdapterOptions {
	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
		self.transport = Some(transport);
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// The injected transport, or a pooled client for this account endpoint
	pub fn transport_for(
		&self,
		cache: &ClientCache,
		settings: &CarrierSettings,
		base_url: &str,
	) -> AdapterResult<Arc<dyn HttpTransport>> {
		if let Some(transport) = &self.transport {
			return Ok(transport.clone());
		}
		let key = ClientKey::new(
			settings.carrier_id().clone(),
			settings.account_id(),
			base_url,
		);
		Ok(Arc::new(ReqwestTransport::new(cache.get_client(&key)?)))
	}

	/// Per-request timeout: the account override, else the adapter default
	pub fn timeout_ms_for(&self, settings: &CarrierSettings) -> u64 {
		settings
			.timeout_ms()
			.unwrap_or(self.request_timeout.as_millis() as u64)
	}
}

/// Where and how one operation is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	pub method: HttpMethod,
	/// Path appended to the base URL, starting with `/`
	pub path: String,
	pub headers: Vec<(String, String)>,
}

impl Route {
	pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			headers: Vec::new(),
		}
	}

	pub fn post(path: impl Into<String>) -> Self {
		Self::new(HttpMethod::Post, path)
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}
}

#[derive(Debug, Clone)]
pub struct HttpProxy {
	carrier_id: CarrierId,
	base_url: String,
	auth: HttpAuth,
	transport: Arc<dyn HttpTransport>,
	retry: RetryPolicy,
	timeout_ms: u64,
	business_statuses: Vec<u16>,
}

impl HttpProxy {
	pub fn new(
		carrier_id: CarrierId,
		base_url: &str,
		transport: Arc<dyn HttpTransport>,
	) -> AdapterResult<Self> {
		let parsed = Url::parse(base_url).map_err(|e| AdapterError::Client(format!(
			"invalid endpoint '{}' for carrier {}: {}",
			base_url, carrier_id, e
		)))?;
		if !matches!(parsed.scheme(), "http" | "https") {
			return Err(AdapterError::Client(format!(
				"endpoint '{}' for carrier {} is not http(s)",
				base_url, carrier_id
			)));
		}

		Ok(Self {
			carrier_id,
			base_url: base_url.trim_end_matches('/').to_string(),
			auth: HttpAuth::None,
			transport,
			retry: RetryPolicy::disabled(),
			timeout_ms: 30_000,
			business_statuses: Vec::new(),
		})
	}

	pub fn with_auth(mut self, auth: HttpAuth) -> Self {
		self.auth = auth;
		self
	}

	pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;
		self
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}

	/// Non-2xx statuses whose body still carries a carrier response
	pub fn with_business_statuses(mut self, statuses: &[u16]) -> Self {
		self.business_statuses = statuses.to_vec();
		self
	}

	pub fn carrier_id(&self) -> &CarrierId {
		&self.carrier_id
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Send one operation. Idempotent operations are retried on transient
	/// failures; everything else goes out at most once.
	pub async fn execute(
		&self,
		operation: Capability,
		route: Route,
		format: WireFormat,
		body: Option<String>,
	) -> Result<CarrierResponse, TransportError> {
		let url = format!("{}{}", self.base_url, route.path);
		let mut request = HttpRequest::new(route.method, url.clone())
			.with_header("accept", format.content_type())
			.with_auth(&self.auth)
			.with_timeout_ms(self.timeout_ms);
		if let Some(body) = body {
			request = request
				.with_header("content-type", format.content_type())
				.with_body(body);
		}
		for (name, value) in route.headers {
			request = request.with_header(name, value);
		}

		debug!(
			"Sending {} request for carrier {} to {}",
			operation, self.carrier_id, url
		);

		let policy = if operation.is_idempotent() {
			self.retry.clone()
		} else {
			RetryPolicy::disabled()
		};

		let response = retry_with_backoff(&policy, TransportError::is_transient, || {
			let request = request.clone();
			async move {
				let response = self.transport.execute(request).await?;
				if (200..300).contains(&response.status)
					|| self.business_statuses.contains(&response.status)
				{
					Ok(response)
				} else {
					Err(TransportError::from_http_failure(response.status))
				}
			}
		})
		.await?;

		debug!(
			"Carrier {} answered {} with status {} ({} bytes)",
			self.carrier_id,
			operation,
			response.status,
			response.body.len()
		);

		Ok(CarrierResponse {
			carrier_id: self.carrier_id.clone(),
			operation,
			status: response.status,
			headers: response.headers,
			body: response.body,
		})
	}
}
