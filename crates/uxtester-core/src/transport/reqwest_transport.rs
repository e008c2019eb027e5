use super::{HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::error::Error as _;
use std::time::Duration;

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh client.
    ///
    /// Per-request timeouts are applied on each call, so the client itself has none.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap a pre-built client (shared connection pool, custom TLS or proxy).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn finish(
        request: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let response =
            request.timeout(timeout).send().await.map_err(|e| map_send_error(e, timeout))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| map_send_error(e, timeout))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let request = self.client.post(url).header("Content-Type", "application/json").json(body);
        Self::finish(request, timeout).await
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, TransportError> {
        let request = self.client.get(url).header("Cache-Control", "no-cache");
        Self::finish(request, timeout).await
    }
}

/// Map a reqwest failure onto the transport taxonomy.
///
/// The URL is stripped first: it carries the API key as a query parameter.
fn map_send_error(error: reqwest::Error, timeout: Duration) -> TransportError {
    let error = error.without_url();
    if error.is_timeout() {
        return TransportError::Timeout(timeout.as_millis() as u64);
    }
    let detail = error_chain(&error);
    if error.is_connect() {
        if looks_like_dns_failure(&detail) {
            TransportError::HostNotFound(detail)
        } else {
            TransportError::ConnectionRefused(detail)
        }
    } else {
        TransportError::Other(detail)
    }
}

fn error_chain(error: &reqwest::Error) -> String {
    let mut detail = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

fn looks_like_dns_failure(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    ["dns error", "failed to lookup", "name or service not known", "no such host", "nodename nor servname"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_failures_are_recognized() {
        assert!(looks_like_dns_failure(
            "error sending request: client error (Connect): dns error: failed to lookup address information"
        ));
        assert!(!looks_like_dns_failure("tcp connect error: Connection refused (os error 111)"));
    }
}
