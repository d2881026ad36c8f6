//! Concurrent fan-out of one unified request to many carrier accounts

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use shipx_adapters::AdapterRegistry;
use shipx_types::{
	codes, CarrierAccount, CarrierRef, DispatchResult, ParsedResponse, RequestValidationError,
	UnifiedRequest,
};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::pipeline::Connection;

#[derive(Debug, Error)]
pub enum DispatchError {
	#[error("Invalid request: {0}")]
	InvalidRequest(#[from] RequestValidationError),

	#[error("No carrier accounts to dispatch to")]
	NoTargets,
}

/// Time limits applied to every dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
	/// Hard limit for the whole batch
	pub batch_deadline: Duration,
	/// Default limit for one carrier account, clamped to the batch deadline
	pub per_carrier_timeout: Duration,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			batch_deadline: Duration::from_secs(30),
			per_carrier_timeout: Duration::from_secs(20),
		}
	}
}

impl DispatchConfig {
	pub fn new(batch_deadline: Duration, per_carrier_timeout: Duration) -> Self {
		Self {
			batch_deadline,
			per_carrier_timeout,
		}
	}

	/// Effective limit for one target
	pub fn timeout_for(&self, override_ms: Option<u64>) -> Duration {
		override_ms
			.map(Duration::from_millis)
			.unwrap_or(self.per_carrier_timeout)
			.min(self.batch_deadline)
	}
}

/// Who a request is sent to
#[derive(Debug, Clone)]
pub enum DispatchTarget {
	/// Resolved against the registry inside the carrier's task
	Account(CarrierAccount),
	/// Already built, e.g. reused across dispatches
	Connection(Arc<Connection>),
}

impl DispatchTarget {
	pub fn carrier_ref(&self) -> CarrierRef {
		match self {
			Self::Account(account) => {
				CarrierRef::new(account.carrier_id.clone(), account.account_id.clone())
			},
			Self::Connection(connection) => connection.target().clone(),
		}
	}

	fn timeout_override_ms(&self) -> Option<u64> {
		match self {
			Self::Account(account) => account.timeout_ms,
			Self::Connection(connection) => connection.timeout_ms(),
		}
	}
}

impl From<CarrierAccount> for DispatchTarget {
	fn from(account: CarrierAccount) -> Self {
		Self::Account(account)
	}
}

impl From<Connection> for DispatchTarget {
	fn from(connection: Connection) -> Self {
		Self::Connection(Arc::new(connection))
	}
}

impl From<Arc<Connection>> for DispatchTarget {
	fn from(connection: Arc<Connection>) -> Self {
		Self::Connection(connection)
	}
}

/// Service for dispatching unified requests to carrier accounts
#[derive(Debug, Clone)]
pub struct Dispatcher {
	registry: Arc<AdapterRegistry>,
	config: DispatchConfig,
}

impl Dispatcher {
	pub fn new(registry: Arc<AdapterRegistry>, config: DispatchConfig) -> Self {
		Self { registry, config }
	}

	pub fn registry(&self) -> &Arc<AdapterRegistry> {
		&self.registry
	}

	pub fn config(&self) -> DispatchConfig {
		self.config
	}

	/// Send `request` to every target concurrently and collect what comes back.
	///
	/// Only an invalid request or an empty target list fails the call; each
	/// carrier's failure, timeout or panic becomes an error entry for that
	/// carrier alone.
	pub async fn dispatch(
		&self,
		request: UnifiedRequest,
		targets: Vec<DispatchTarget>,
	) -> Result<DispatchResult, DispatchError> {
		request.validate()?;
		if targets.is_empty() {
			return Err(DispatchError::NoTargets);
		}

		let capability = request.capability();
		let started = Instant::now();
		let deadline = tokio::time::Instant::now() + self.config.batch_deadline;
		info!(
			"Dispatching {} request to {} carrier account(s)",
			capability,
			targets.len()
		);

		let request = Arc::new(request);
		let refs: Vec<CarrierRef> = targets.iter().map(DispatchTarget::carrier_ref).collect();
		let mut tasks = JoinSet::new();

		for (index, target) in targets.into_iter().enumerate() {
			let limit = self.config.timeout_for(target.timeout_override_ms());
			let registry = Arc::clone(&self.registry);
			let request = Arc::clone(&request);
			let carrier = refs[index].clone();

			tasks.spawn(async move {
				debug!(
					"Starting {} pipeline for {}/{} with {}ms timeout",
					capability,
					carrier.carrier_id,
					carrier.account_id,
					limit.as_millis()
				);
				let pipeline = AssertUnwindSafe(run_target(registry, target, request)).catch_unwind();
				let parsed = match tokio::time::timeout(limit, pipeline).await {
					Ok(Ok(parsed)) => parsed,
					Ok(Err(panic)) => ParsedResponse::from_error(carrier.error(
						codes::INTERNAL,
						format!("Carrier pipeline panicked: {}", panic_message(&*panic)),
					)),
					Err(_) => ParsedResponse::from_error(carrier.timeout(limit.as_millis() as u64)),
				};
				(index, parsed)
			});
		}

		let mut outcome = DispatchResult::default();
		let mut finished = vec![false; refs.len()];
		let mut deadline_hit = false;

		loop {
			match tokio::time::timeout_at(deadline, tasks.join_next()).await {
				Ok(Some(Ok((index, parsed)))) => {
					finished[index] = true;
					for error in &parsed.errors {
						warn!(
							"Carrier {}/{} reported {}: {}",
							error.carrier_id, error.account_id, error.code, error.message
						);
					}
					outcome.extend(parsed);
				},
				Ok(Some(Err(e))) => warn!("Carrier task failed to complete: {}", e),
				Ok(None) => break,
				Err(_) => {
					deadline_hit = true;
					tasks.abort_all();
					break;
				},
			}
		}

		let batch_ms = self.config.batch_deadline.as_millis() as u64;
		for (carrier, _) in refs.iter().zip(&finished).filter(|(_, done)| !**done) {
			if deadline_hit {
				warn!(
					"Carrier {}/{} still pending at the {}ms batch deadline",
					carrier.carrier_id, carrier.account_id, batch_ms
				);
				outcome.push_error(carrier.timeout(batch_ms));
			} else {
				outcome.push_error(
					carrier.error(codes::INTERNAL, "Carrier task ended without a response"),
				);
			}
		}

		info!(
			"Dispatch completed in {}ms: {} result(s), {} error(s) from {} carrier account(s)",
			started.elapsed().as_millis(),
			outcome.results.len(),
			outcome.errors.len(),
			refs.len()
		);
		Ok(outcome)
	}
}

async fn run_target(
	registry: Arc<AdapterRegistry>,
	target: DispatchTarget,
	request: Arc<UnifiedRequest>,
) -> ParsedResponse {
	match target {
		DispatchTarget::Connection(connection) => connection.run(&request).await,
		DispatchTarget::Account(account) => {
			match Connection::establish_for(&registry, &account, Some(request.capability())) {
				Ok(connection) => connection.run(&request).await,
				Err(error) => ParsedResponse::from_error(error),
			}
		},
	}
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
	if let Some(message) = panic.downcast_ref::<&str>() {
		message
	} else if let Some(message) = panic.downcast_ref::<String>() {
		message
	} else {
		"unknown panic"
	}
}

#[cfg(test)]
mod tests;
