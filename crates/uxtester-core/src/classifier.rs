//! Error classification: the one place raw failures become [`ClassifiedError`]s.
//!
//! Call sites never inspect status codes themselves; they build a
//! [`RawFailure`] and act on the returned kind.

use crate::security::mask_sensitive_info;
use crate::transport::TransportError;
use uxtester_types::{ClassifiedError, ErrorKind};

/// Maximum characters of a response body kept in the internal message.
const MAX_BODY_CHARS: usize = 300;

/// A failure as observed at the transport boundary, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawFailure {
    /// No response was received.
    NoResponse(TransportError),
    /// A response with a non-success status.
    Http { status: u16, body: String },
    /// A success status whose body carried no generated text.
    EmptyResponse { detail: String },
}

impl RawFailure {
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http { status, body: body.into() }
    }
}

impl From<TransportError> for RawFailure {
    fn from(error: TransportError) -> Self {
        Self::NoResponse(error)
    }
}

/// Map a raw failure to its kind. First match wins.
pub fn classify_kind(failure: &RawFailure) -> ErrorKind {
    match failure {
        RawFailure::NoResponse(TransportError::Timeout(_)) => ErrorKind::Timeout,
        RawFailure::NoResponse(
            TransportError::ConnectionRefused(_) | TransportError::HostNotFound(_),
        ) => ErrorKind::NetworkError,
        RawFailure::NoResponse(TransportError::Other(_)) => ErrorKind::UnknownError,
        RawFailure::Http { status: 400, .. } => ErrorKind::BadRequest,
        RawFailure::Http { status: 401 | 403, .. } => ErrorKind::AuthInvalid,
        RawFailure::Http { status: 429, .. } => ErrorKind::QuotaExceeded,
        RawFailure::Http { status, .. } if *status >= 500 => ErrorKind::ServerError,
        RawFailure::Http { .. } => ErrorKind::UnknownError,
        RawFailure::EmptyResponse { .. } => ErrorKind::EmptyResponseError,
    }
}

/// Classify a raw failure.
///
/// The user message is fixed by the kind; the internal message keeps the raw
/// detail with credentials masked and bodies truncated.
pub fn classify(failure: &RawFailure) -> ClassifiedError {
    let kind = classify_kind(failure);
    let internal = match failure {
        RawFailure::NoResponse(error) => error.to_string(),
        RawFailure::Http { status, body } => format!("HTTP {}: {}", status, truncate(body)),
        RawFailure::EmptyResponse { detail } => format!("empty response: {detail}"),
    };
    ClassifiedError::new(kind, mask_sensitive_info(&internal))
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_BODY_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(MAX_BODY_CHARS).collect();
    format!("{head}...")
}
