//! Classified request errors.
//!
//! Every failure that leaves the orchestrator is one of these. The internal
//! message is for diagnostics (masked before logging); the user message is a
//! fixed, safe string chosen by the kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of failure kinds a request can end with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Local, pre-network validation failure
    ValidationError,
    /// Every model candidate failed probing
    NoWorkingModelError,
    /// 401/403 from the provider (or no usable key in the session)
    AuthInvalid,
    /// 400 from the provider
    BadRequest,
    /// 429 from the provider
    QuotaExceeded,
    /// No response within the attempt timeout
    Timeout,
    /// Connection refused or host not found
    NetworkError,
    /// 5xx from the provider
    ServerError,
    /// Caller-initiated cancellation
    Cancelled,
    /// 200 response without generated text
    EmptyResponseError,
    /// Anything else
    UnknownError,
}

impl ErrorKind {
    /// Machine-readable error code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NoWorkingModelError => "NO_WORKING_MODEL",
            Self::AuthInvalid => "API_KEY_INVALID",
            Self::BadRequest => "API_BAD_REQUEST",
            Self::QuotaExceeded => "API_QUOTA_EXCEEDED",
            Self::Timeout => "TIMEOUT_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ServerError => "API_SERVER_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::EmptyResponseError => "EMPTY_RESPONSE",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }

    /// Fixed user-facing message for this kind.
    ///
    /// Independent of the raw transport detail so nothing internal reaches the UI.
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::ValidationError => "The request is invalid. Please check the uploaded images.",
            Self::NoWorkingModelError => {
                "No usable Gemini model was found. Please check your API key."
            },
            Self::AuthInvalid => {
                "The API key is invalid or lacks permission. Please check your API key."
            },
            Self::BadRequest => "The request was rejected. Please check the image format or size.",
            Self::QuotaExceeded => "API usage quota exceeded. Please try again later.",
            Self::Timeout => {
                "The request timed out. The images may be too large or the network unstable."
            },
            Self::NetworkError => "Please check your internet connection.",
            Self::ServerError => {
                "The server is having temporary problems. Please try again later."
            },
            Self::Cancelled => "The analysis was cancelled.",
            Self::EmptyResponseError => "No response was received from the Gemini API.",
            Self::UnknownError => "An unexpected error occurred. Please try again later.",
        }
    }

    /// Whether a failure of this kind may be retried within the attempt budget.
    ///
    /// `QuotaExceeded` is retryable here; the orchestrator tries a model
    /// fallback before charging it to the budget.
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded
                | Self::Timeout
                | Self::NetworkError
                | Self::ServerError
                | Self::EmptyResponseError
                | Self::UnknownError
        )
    }

    /// Whether a failure of this kind ends the run without consulting the retry policy.
    pub const fn is_fatal(self) -> bool {
        !self.is_retryable()
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A normalized failure with a kind, a diagnostic message and a user-safe message.
///
/// Immutable once constructed: fields are only reachable through accessors.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{kind}: {internal_message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    internal_message: String,
    user_message: String,
    timestamp_ms: i64,
}

impl ClassifiedError {
    /// Build an error carrying the kind's fixed user message.
    pub fn new(kind: ErrorKind, internal_message: impl Into<String>) -> Self {
        Self::with_user_message(kind, internal_message, kind.user_message())
    }

    /// Build an error with an explicit user message (validation reasons, session expiry).
    pub fn with_user_message(
        kind: ErrorKind,
        internal_message: impl Into<String>,
        user_message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            internal_message: internal_message.into(),
            user_message: user_message.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Validation failure; the reason is shown to the user verbatim.
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::with_user_message(
            ErrorKind::ValidationError,
            format!("validation failed for {field}: {reason}"),
            reason,
        )
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Cancelled, "run cancelled by caller")
    }

    pub fn no_working_model(tried: usize) -> Self {
        Self::new(
            ErrorKind::NoWorkingModelError,
            format!("no working model found after probing {tried} candidate(s)"),
        )
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn internal_message(&self) -> &str {
        &self.internal_message
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub const fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_kinds_are_not_retryable() {
        for kind in [
            ErrorKind::ValidationError,
            ErrorKind::NoWorkingModelError,
            ErrorKind::AuthInvalid,
            ErrorKind::BadRequest,
            ErrorKind::Cancelled,
        ] {
            assert!(kind.is_fatal(), "{kind} should be fatal");
        }
    }

    #[test]
    fn transient_kinds_are_retryable() {
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::NetworkError,
            ErrorKind::ServerError,
            ErrorKind::EmptyResponseError,
            ErrorKind::UnknownError,
            ErrorKind::QuotaExceeded,
        ] {
            assert!(kind.is_retryable(), "{kind} should be retryable");
        }
    }

    #[test]
    fn validation_error_shows_reason_to_user() {
        let err = ClassifiedError::validation("images", "At most 3 images can be analyzed at once.");
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert_eq!(err.user_message(), "At most 3 images can be analyzed at once.");
        assert!(err.internal_message().contains("images"));
    }

    #[test]
    fn user_message_does_not_carry_internal_detail() {
        let err = ClassifiedError::new(
            ErrorKind::ServerError,
            "HTTP 503 at https://generativelanguage.googleapis.com/v1beta/models/x",
        );
        assert!(!err.user_message().contains("googleapis"));
        assert_eq!(err.code(), "API_SERVER_ERROR");
        assert!(err.timestamp_ms() > 0);
    }
}
