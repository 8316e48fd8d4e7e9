//! Exponential-backoff retry policy for external recognition-service calls.
//!
//! One policy instance is injected into each orchestrator component instead
//! of duplicating inline retry loops at call sites. Only transient errors
//! (see [`CoreError::is_transient`](crate::error::CoreError::is_transient))
//! should be retried.

use std::time::Duration;

use rand::Rng;

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Upper bound on the random jitter added to each delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            multiplier: 2.0,
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempt` attempts have
    /// already been made.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Deterministic backoff delay before attempt `attempt + 1`, where
    /// `attempt` counts the attempts already made (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let millis = self.base_delay.as_millis() as f64 * self.multiplier.powi(exponent as i32);
        Duration::from_millis(millis as u64)
    }

    /// [`delay_for`](Self::delay_for) plus uniform random jitter, to avoid
    /// synchronized retries from concurrent requests.
    pub fn jittered_delay_for(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.delay_for(attempt);
        }
        let jitter = rand::rng().random_range(0..=jitter_ms);
        self.delay_for(attempt) + Duration::from_millis(jitter)
    }
}
