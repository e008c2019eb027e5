//! Model probing: a minimal, short-timeout call that checks whether a
//! (key, model) pair is usable.

use crate::classifier::{classify, RawFailure};
use crate::transport::gemini::{generate_content_url, probe_body};
use crate::transport::{post_with_deadline, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uxtester_types::ClassifiedError;

#[derive(Clone)]
pub struct ModelProbe {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
}

impl ModelProbe {
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self { transport, base_url: base_url.into(), timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `model` with `api_key`.
    ///
    /// Only HTTP 200 passes. Every other outcome (auth failures included) is
    /// a plain `false`; the only `Err` is cancellation.
    pub async fn probe(
        &self,
        model: &str,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<bool, ClassifiedError> {
        let url = generate_content_url(&self.base_url, model, api_key);
        let outcome =
            post_with_deadline(self.transport.as_ref(), &url, &probe_body(), self.timeout, cancel)
                .await?;

        let failure = match outcome {
            Ok(response) if response.status == 200 => {
                tracing::debug!("Probe passed for model {}", model);
                return Ok(true);
            },
            Ok(response) => RawFailure::http(response.status, response.body),
            Err(error) => RawFailure::NoResponse(error),
        };
        let error = classify(&failure);
        tracing::debug!(
            "Probe failed for model {}: {} ({})",
            model,
            error.code(),
            error.internal_message()
        );
        Ok(false)
    }
}
