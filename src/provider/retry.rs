//! Bounded exponential backoff and the pluggable delay used between attempts.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Delay::delay`].
pub type DelayFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Suspends the current call between retry attempts.
///
/// Production code uses [`TokioDelay`]; tests substitute a fake clock that records the requested
/// durations and resolves immediately.
pub trait Delay
where
	Self: Send + Sync,
{
	/// Waits for `duration` without blocking other tasks.
	fn delay(&self, duration: Duration) -> DelayFuture<'_>;
}

/// Timer-backed delay built on `tokio::time::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioDelay;
impl Delay for TokioDelay {
	fn delay(&self, duration: Duration) -> DelayFuture<'_> {
		let wait = std::time::Duration::try_from(duration).unwrap_or_default();

		Box::pin(tokio::time::sleep(wait))
	}
}

/// Attempt budget and backoff schedule for provider calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
	/// Total attempts, including the first; values below one are treated as one.
	pub max_attempts: u32,
	/// Delay after the first failed attempt; doubles per subsequent attempt.
	pub base_delay: Duration,
	/// Upper bound for any single delay, Retry-After hints included.
	pub max_delay: Duration,
}
impl RetryPolicy {
	/// Creates a policy with the provided attempt budget and base delay.
	pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
		Self { max_attempts, base_delay, ..Self::default() }
	}

	/// Overrides the delay cap.
	pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
		self.max_delay = max_delay;

		self
	}

	/// Effective attempt budget.
	pub fn attempts(&self) -> u32 {
		self.max_attempts.max(1)
	}

	/// Exponential backoff after the `attempt`-th failure (1-based): `base * 2^(attempt - 1)`.
	pub fn backoff(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(30);
		let factor = 1_i32 << exponent;

		self.base_delay.saturating_mul(factor).min(self.max_delay)
	}

	/// Delay to wait after the `attempt`-th failure, honoring a provider Retry-After hint.
	pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
		let backoff = self.backoff(attempt);

		match retry_after {
			Some(hint) if hint > backoff => hint.min(self.max_delay),
			_ => backoff,
		}
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self { max_attempts: 3, base_delay: Duration::seconds(1), max_delay: Duration::seconds(30) }
	}
}
