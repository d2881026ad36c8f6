//! Bounded exponential backoff for idempotent carrier calls

use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
	/// Retries after the first attempt; zero disables retrying
	pub max_retries: u32,
	pub initial_delay: Duration,
	pub max_delay: Duration,
	pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 2,
			initial_delay: Duration::from_millis(200),
			max_delay: Duration::from_secs(2),
			backoff_multiplier: 2.0,
		}
	}
}

impl RetryPolicy {
	pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
		Self {
			max_retries,
			initial_delay,
			max_delay,
			..Self::default()
		}
	}

	pub fn disabled() -> Self {
		Self {
			max_retries: 0,
			..Self::default()
		}
	}

	/// Delay before retry number `retry` (zero-based), capped at `max_delay`
	pub fn delay_for_retry(&self, retry: u32) -> Duration {
		let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
		let millis = self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
		if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
			return self.max_delay;
		}
		Duration::from_millis(millis as u64)
	}
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's retries are spent. Returns the last error.
pub async fn retry_with_backoff<T, E, F, Fut, R>(
	policy: &RetryPolicy,
	is_retryable: R,
	mut operation: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	R: Fn(&E) -> bool,
	E: std::fmt::Display,
{
	let mut retry = 0;
	loop {
		match operation().await {
			Ok(value) => return Ok(value),
			Err(error) if retry < policy.max_retries && is_retryable(&error) => {
				let delay = policy.delay_for_retry(retry);
				warn!(
					"Transient failure (attempt {} of {}), retrying in {:?}: {}",
					retry + 1,
					policy.max_retries + 1,
					delay,
					error
				);
				tokio::time::sleep(delay).await;
				retry += 1;
			},
			Err(error) => return Err(error),
		}
	}
}
