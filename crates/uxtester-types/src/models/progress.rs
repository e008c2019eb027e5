//! Progress and fallback notifications emitted during a run.

use serde::{Deserialize, Serialize};

/// One progress update for a single run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Human-readable status line
    pub message: String,
    /// Completion percentage, 0-100, never decreasing within a run
    pub percent: u8,
    /// Retry index the event belongs to (0 for the first attempt)
    pub retry_attempt: u32,
}

impl ProgressEvent {
    pub fn new(message: impl Into<String>, percent: u8, retry_attempt: u32) -> Self {
        Self { message: message.into(), percent: percent.min(100), retry_attempt }
    }
}

/// Notice that the active model was switched after a quota failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FallbackNotice {
    pub from_model: String,
    pub to_model: String,
    /// Human-readable explanation naming both models
    pub reason: String,
}
