//! Transport capability and the Gemini wire format.
//!
//! The orchestrator only talks to the network through [`Transport`]. HTTP
//! error statuses come back as ordinary [`HttpResponse`]s; [`TransportError`]
//! is reserved for calls that produced no response at all.

pub mod gemini;
mod reqwest_transport;


pub use reqwest_transport::ReqwestTransport;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use uxtester_types::ClassifiedError;

/// Status and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A call that never produced a response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("host not found: {0}")]
    HostNotFound(String),

    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether the failure suggests the host cannot be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionRefused(_) | Self::HostNotFound(_))
    }
}

/// Minimal HTTP capability consumed by the orchestrator.
///
/// Implementations must honor `timeout` per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;

    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError>;
}

/// Outcome of a single call made under a deadline and a cancellation token.
///
/// The outer `Err` is the cancellation; the inner result is the call itself.
pub(crate) type CallOutcome = Result<Result<HttpResponse, TransportError>, ClassifiedError>;

pub(crate) async fn post_with_deadline(
    transport: &dyn Transport,
    url: &str,
    body: &Value,
    timeout: Duration,
    cancel: &CancellationToken,
) -> CallOutcome {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ClassifiedError::cancelled()),
        outcome = tokio::time::timeout(timeout, transport.post(url, body, timeout)) => {
            Ok(outcome.unwrap_or_else(|_| Err(TransportError::Timeout(timeout.as_millis() as u64))))
        }
    }
}

pub(crate) async fn get_with_deadline(
    transport: &dyn Transport,
    url: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> CallOutcome {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ClassifiedError::cancelled()),
        outcome = tokio::time::timeout(timeout, transport.get(url, timeout)) => {
            Ok(outcome.unwrap_or_else(|_| Err(TransportError::Timeout(timeout.as_millis() as u64))))
        }
    }
}

/// Sleep that ends early with `Cancelled` when the token fires.
pub(crate) async fn sleep_or_cancel(
    delay: Duration,
    cancel: &CancellationToken,
) -> Result<(), ClassifiedError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ClassifiedError::cancelled()),
        () = tokio::time::sleep(delay) => Ok(()),
    }
}
