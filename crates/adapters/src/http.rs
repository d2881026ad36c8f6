//! HTTP transport seam between carrier proxies and the network

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use shipx_types::{SecretString, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
	Get,
	Post,
	Delete,
}

/// Authentication applied to every request a proxy sends
#[derive(Debug, Clone, PartialEq)]
pub enum HttpAuth {
	None,
	Basic {
		username: String,
		password: SecretString,
	},
	Header {
		name: String,
		value: SecretString,
	},
}

impl HttpAuth {
	pub fn basic(username: impl Into<String>, password: SecretString) -> Self {
		Self::Basic {
			username: username.into(),
			password,
		}
	}

	pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
		match self {
			Self::None => {},
			Self::Basic { username, password } => {
				let pair = format!("{}:{}", username, password.expose_secret());
				headers.insert(
					"authorization".to_string(),
					format!("Basic {}", BASE64.encode(pair.as_bytes())),
				);
			},
			Self::Header { name, value } => {
				headers.insert(name.to_ascii_lowercase(), value.expose_secret().to_string());
			},
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
	pub method: HttpMethod,
	pub url: String,
	/// Lower-cased header names
	pub headers: BTreeMap<String, String>,
	pub body: Option<String>,
	pub timeout_ms: u64,
}

impl HttpRequest {
	pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
		Self {
			method,
			url: url.into(),
			headers: BTreeMap::new(),
			body: None,
			timeout_ms: 30_000,
		}
	}

	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers
			.insert(name.into().to_ascii_lowercase(), value.into());
		self
	}

	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());
		self
	}

	pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
		auth.apply(&mut self.headers);
		self
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
	pub status: u16,
	pub headers: BTreeMap<String, String>,
	pub body: Vec<u8>,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
		Self {
			status,
			headers: BTreeMap::new(),
			body: body.into(),
		}
	}
}

/// Executes one HTTP exchange
///
/// Implementations return `Ok` for any response that arrived, whatever its
/// status; status classification belongs to the proxy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync + Debug {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Production transport backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
	client: Arc<Client>,
}

impl ReqwestTransport {
	pub fn new(client: Arc<Client>) -> Self {
		Self { client }
	}
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
	async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
		let HttpRequest {
			method,
			url,
			headers,
			body,
			timeout_ms,
		} = request;

		let mut builder = match method {
			HttpMethod::Get => self.client.get(&url),
			HttpMethod::Post => self.client.post(&url),
			HttpMethod::Delete => self.client.delete(&url),
		}
		.timeout(Duration::from_millis(timeout_ms));

		for (name, value) in &headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = body {
			builder = builder.body(body);
		}

		let response = builder
			.send()
			.await
			.map_err(|e| classify_error(&url, timeout_ms, e))?;

		let status = response.status().as_u16();
		let headers = response
			.headers()
			.iter()
			.filter_map(|(name, value)| {
				value
					.to_str()
					.ok()
					.map(|value| (name.as_str().to_string(), value.to_string()))
			})
			.collect();
		let body = response
			.bytes()
			.await
			.map_err(|e| classify_error(&url, timeout_ms, e))?
			.to_vec();

		Ok(HttpResponse {
			status,
			headers,
			body,
		})
	}
}

fn classify_error(url: &str, timeout_ms: u64, error: reqwest::Error) -> TransportError {
	if error.is_timeout() {
		TransportError::Timeout {
			url: url.to_string(),
			timeout_ms,
		}
	} else if error.is_connect() {
		TransportError::Connect {
			url: url.to_string(),
			reason: error.to_string(),
		}
	} else {
		TransportError::Request(error.to_string())
	}
}
