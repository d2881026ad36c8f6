//! Per-account HTTP client pools
//!
//! Each carrier factory owns one cache, so pools are never shared between
//! carriers. Within a carrier, one client exists per (account, endpoint).

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use shipx_types::{AdapterError, AdapterResult, CarrierId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey {
	pub carrier_id: CarrierId,
	pub account_id: String,
	pub base_url: String,
}

impl ClientKey {
	pub fn new(carrier_id: CarrierId, account_id: impl Into<String>, base_url: impl Into<String>) -> Self {
		Self {
			carrier_id,
			account_id: account_id.into(),
			base_url: base_url.into(),
		}
	}
}

/// Pool tuning shared by every client a cache creates
#[derive(Debug, Clone)]
pub struct PoolOptions {
	pub max_idle_per_host: usize,
	pub idle_timeout: Duration,
	pub connect_timeout: Duration,
	pub user_agent: String,
}

impl Default for PoolOptions {
	fn default() -> Self {
		Self {
			max_idle_per_host: 10,
			idle_timeout: Duration::from_secs(90),
			connect_timeout: Duration::from_secs(5),
			user_agent: format!("shipx/{}", env!("CARGO_PKG_VERSION")),
		}
	}
}

#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientKey, CachedClient>>,
	options: PoolOptions,
	ttl: Duration,
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new(PoolOptions::default())
	}
}

impl ClientCache {
	/// Cache with a 30-minute client TTL
	pub fn new(options: PoolOptions) -> Self {
		Self::with_ttl(options, Duration::from_secs(30 * 60))
	}

	pub fn with_ttl(options: PoolOptions, ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			options,
			ttl,
		}
	}

	/// Get or create the pooled client for an account endpoint
	pub fn get_client(&self, key: &ClientKey) -> AdapterResult<Arc<Client>> {
		self.clients.remove_if(key, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				warn!(
					"Client for {} account {} expired (age: {:?}), creating a new one",
					key.carrier_id,
					key.account_id,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(key) {
			debug!(
				"Reusing cached client for {} account {} ({})",
				key.carrier_id, key.account_id, key.base_url
			);
			return Ok(cached.client.clone());
		}

		let cached = CachedClient::new(self.build_client()?);
		match self.clients.entry(key.clone()) {
			// Lost a race with a concurrent caller; keep theirs
			Entry::Occupied(entry) => Ok(entry.get().client.clone()),
			Entry::Vacant(entry) => {
				debug!(
					"Cached new client for {} account {} ({})",
					key.carrier_id, key.account_id, key.base_url
				);
				Ok(entry.insert(cached).client.clone())
			},
		}
	}

	fn build_client(&self) -> AdapterResult<Client> {
		ClientBuilder::new()
			.pool_max_idle_per_host(self.options.max_idle_per_host)
			.pool_idle_timeout(self.options.idle_timeout)
			.connect_timeout(self.options.connect_timeout)
			.tcp_keepalive(Duration::from_secs(60))
			.user_agent(self.options.user_agent.clone())
			.use_rustls_tls()
			.build()
			.map_err(|e| AdapterError::Client(e.to_string()))
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}

	/// Drop expired clients
	pub fn cleanup_expired(&self) -> usize {
		let before = self.clients.len();
		self.clients.retain(|_, cached| !cached.is_expired(self.ttl));
		before - self.clients.len()
	}
}
