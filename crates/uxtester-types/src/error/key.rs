//! Key storage errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the key storage capability.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum KeyError {
    /// Key failed the charset/length check
    #[error("Invalid API key format: {reason}")]
    InvalidFormat {
        /// Which rule the key violated
        reason: String,
    },

    /// Backing storage refused the operation
    #[error("Key storage error: {message}")]
    Storage {
        /// Description of the storage failure
        message: String,
    },
}
