//! Retry policy for analysis attempts.
//!
//! Pure computation: attempt budget, exponential backoff between attempts,
//! escalating per-attempt timeouts and the attempt share of the progress bar.


use std::time::Duration;
use uxtester_types::{ErrorKind, RetryConfig, TimeoutConfig};

/// Share of the progress range consumed by attempts; the rest is reserved
/// for the completion signal.
pub const ATTEMPT_PROGRESS_SHARE: u32 = 50;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and surface the error.
    Stop,
    /// Wait, then run the next attempt.
    RetryAfter(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    retry: RetryConfig,
    timeouts: TimeoutConfig,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default(), TimeoutConfig::default())
    }
}

impl RetryPolicy {
    pub const fn new(retry: RetryConfig, timeouts: TimeoutConfig) -> Self {
        Self { retry, timeouts }
    }

    /// Retries allowed after the first attempt.
    pub const fn max_retries(&self) -> u32 {
        self.retry.max_retries
    }

    /// Total tries including the first.
    pub const fn max_attempts(&self) -> u32 {
        self.retry.max_retries.saturating_add(1)
    }

    /// Backoff before the attempt following `attempt`: `base * multiplier^attempt`,
    /// rounded to the nearest millisecond.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let ms = self.retry.base_delay_ms as f64 * self.retry.backoff_multiplier.powi(exponent);
        Duration::from_millis(ms.round() as u64)
    }

    /// Timeout for `attempt`; later attempts get longer budgets.
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let ms = match attempt {
            0 => self.timeouts.first_attempt_ms,
            1 => self.timeouts.retry_attempt_ms,
            _ => self.timeouts.final_attempt_ms,
        };
        Duration::from_millis(ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.probe_ms)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.connectivity_check_ms)
    }

    /// Progress percent reported when `attempt` starts.
    pub fn progress_for(&self, attempt: u32) -> u8 {
        let attempts = u64::from(self.max_attempts());
        let value = u64::from(attempt).min(attempts) * u64::from(ATTEMPT_PROGRESS_SHARE) / attempts;
        value as u8
    }

    /// Retry-or-stop for a classified failure on `attempt`.
    ///
    /// Quota fallback is not decided here; by the time a quota failure reaches
    /// this point no fallback model was available.
    pub fn decide(&self, kind: ErrorKind, attempt: u32) -> RetryDecision {
        if kind.is_fatal() || attempt >= self.retry.max_retries {
            RetryDecision::Stop
        } else {
            RetryDecision::RetryAfter(self.delay_for(attempt))
        }
    }
}

/// Human form of a delay: whole seconds without a fraction, otherwise decimals ("4.5").
pub fn format_delay_secs(delay: Duration) -> String {
    let secs = delay.as_millis() as f64 / 1000.0;
    format!("{secs}")
}
