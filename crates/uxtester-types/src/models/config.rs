//! Orchestrator configuration types.

use super::ImageLimits;
use serde::{Deserialize, Serialize};

/// Per-call timeouts in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Model probe (key validation) timeout
    pub probe_ms: u64,
    /// Timeout of attempt 0
    pub first_attempt_ms: u64,
    /// Timeout of attempt 1
    pub retry_attempt_ms: u64,
    /// Timeout of attempt 2 and later
    pub final_attempt_ms: u64,
    /// Connectivity check timeout
    pub connectivity_check_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            probe_ms: 10_000,
            first_attempt_ms: 45_000,
            retry_attempt_ms: 60_000,
            final_attempt_ms: 90_000,
            connectivity_check_ms: 5_000,
        }
    }
}

/// Configuration for retry behavior on transient errors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    pub base_delay_ms: u64,
    /// Factor applied to the delay for each further retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_retries: 3, base_delay_ms: 2_000, backoff_multiplier: 1.5 }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_session_idle_secs() -> u64 {
    30 * 60
}

/// Orchestrator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrchestratorConfig {
    /// Provider API base URL (without trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model the user prefers until they pick another.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub timeouts: TimeoutConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub limits: ImageLimits,

    /// Idle time after which the session key expires.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            timeouts: TimeoutConfig::default(),
            retry: RetryConfig::default(),
            limits: ImageLimits::default(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: OrchestratorConfig =
            serde_json::from_str(r#"{"retry":{"max_retries":5}}"#).unwrap();
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_ms, 2_000);
        assert_eq!(config.timeouts, TimeoutConfig::default());
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.limits.max_images, 3);
    }
}
