//! Bounded retry with randomized backoff for rate-limited fetches.
//!
//! Only the rate-limited path loops: content, not-found and transport
//! failures are final outcomes and pass straight through to the caller.

use crate::models::FetchOutcome;
use rand::Rng;
use std::future::Future;
use std::ops::RangeInclusive;
use std::time::Duration;
use tracing::{error, warn};

/// Bounds for retrying a rate-limited fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, first attempt included.
    pub max_attempts: usize,
    /// Lower bound of the backoff delay, in whole seconds.
    pub min_delay_secs: u64,
    /// Upper bound (inclusive) of the backoff delay, in whole seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay_secs: 1,
            max_delay_secs: 7,
        }
    }
}

impl RetryPolicy {
    /// Inclusive range the backoff delay is drawn from.
    pub fn delay_range(&self) -> RangeInclusive<u64> {
        self.min_delay_secs..=self.max_delay_secs
    }
}

impl From<&crate::config::RetryConfig> for RetryPolicy {
    fn from(config: &crate::config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            min_delay_secs: config.min_delay_secs,
            max_delay_secs: config.max_delay_secs,
        }
    }
}

/// Source of the pause inserted before the next attempt.
///
/// The production implementation is random; tests substitute deterministic
/// ones.
pub trait Backoff {
    /// Pick the delay to sleep before the next attempt.
    fn next_delay(&mut self) -> Duration;
}

/// Uniformly random delay over the policy's inclusive range of seconds.
///
/// Draws from the unseeded process RNG, so delays differ across runs.
pub struct RandomBackoff {
    range: RangeInclusive<u64>,
}

impl RandomBackoff {
    /// Create a backoff source for a policy.
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            range: policy.delay_range(),
        }
    }
}

impl Backoff for RandomBackoff {
    fn next_delay(&mut self) -> Duration {
        Duration::from_secs(rand::thread_rng().gen_range(self.range.clone()))
    }
}

/// Run a fetch attempt under bounded rate-limit retries.
///
/// Re-invokes `attempt` only while it returns
/// [`FetchOutcome::RateLimited`], sleeping a backoff-chosen delay between
/// attempts (never after the last one). Any other outcome is final and
/// returned immediately. After `max_attempts` rate-limited attempts the
/// final rate-limited outcome is returned; the caller decides how to report
/// the abandoned topic.
pub async fn retry_rate_limited<F, Fut, B>(
    policy: &RetryPolicy,
    mut backoff: B,
    mut attempt: F,
) -> FetchOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchOutcome>,
    B: Backoff,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt_no in 1..=max_attempts {
        let outcome = attempt().await;

        if !outcome.is_rate_limited() {
            return outcome;
        }

        if attempt_no == max_attempts {
            break;
        }

        let delay = backoff.next_delay();
        warn!(
            attempt = attempt_no,
            delay_secs = delay.as_secs(),
            "Rate limit exceeded. Retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }

    error!("Could not retrieve page after {} attempts", max_attempts);
    FetchOutcome::RateLimited
}
