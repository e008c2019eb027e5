//! Connectivity check against the model-listing endpoint.

use crate::security::mask_sensitive_info;
use crate::transport::gemini::list_models_url;
use crate::transport::{get_with_deadline, Transport};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uxtester_types::ClassifiedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionQuality {
    Excellent,
    Good,
    Poor,
    Disconnected,
}

/// Latency class of a successful round trip.
pub fn classify_latency(latency: Duration) -> ConnectionQuality {
    match latency.as_millis() {
        0..=199 => ConnectionQuality::Excellent,
        200..=499 => ConnectionQuality::Good,
        _ => ConnectionQuality::Poor,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkQuality {
    pub is_connected: bool,
    /// Round trip in milliseconds, when a response arrived
    pub latency_ms: Option<u64>,
    pub quality: ConnectionQuality,
}

impl NetworkQuality {
    fn disconnected() -> Self {
        Self { is_connected: false, latency_ms: None, quality: ConnectionQuality::Disconnected }
    }
}

/// `GET {base}/models?key=...` under `timeout`.
///
/// 200, 401 and 403 all prove the host is reachable. `Err` only on cancellation.
pub async fn check_connectivity(
    transport: &dyn Transport,
    base_url: &str,
    api_key: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<NetworkQuality, ClassifiedError> {
    let url = list_models_url(base_url, api_key);
    let started = Instant::now();
    let outcome = get_with_deadline(transport, &url, timeout, cancel).await?;
    let latency = started.elapsed();

    match outcome {
        Ok(response) if matches!(response.status, 200 | 401 | 403) => {
            let quality = NetworkQuality {
                is_connected: true,
                latency_ms: Some(latency.as_millis() as u64),
                quality: classify_latency(latency),
            };
            tracing::debug!("Connectivity check: {:?} in {:?}", quality.quality, latency);
            Ok(quality)
        },
        Ok(response) => {
            tracing::warn!("Connectivity check got HTTP {}", response.status);
            Ok(NetworkQuality::disconnected())
        },
        Err(error) => {
            tracing::warn!("Connectivity check failed: {}", mask_sensitive_info(&error.to_string()));
            Ok(NetworkQuality::disconnected())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{status, ScriptedTransport};
    use crate::transport::TransportError;

    #[test]
    fn latency_classes() {
        assert_eq!(classify_latency(Duration::from_millis(0)), ConnectionQuality::Excellent);
        assert_eq!(classify_latency(Duration::from_millis(199)), ConnectionQuality::Excellent);
        assert_eq!(classify_latency(Duration::from_millis(200)), ConnectionQuality::Good);
        assert_eq!(classify_latency(Duration::from_millis(499)), ConnectionQuality::Good);
        assert_eq!(classify_latency(Duration::from_millis(500)), ConnectionQuality::Poor);
    }

    #[tokio::test]
    async fn auth_errors_still_mean_connected() {
        let transport = ScriptedTransport::new();
        transport.push_get(status(200)).push_get(status(401)).push_get(status(403));
        let cancel = CancellationToken::new();
        for _ in 0..3 {
            let quality =
                check_connectivity(&transport, "https://x.test", "k", Duration::from_secs(5), &cancel)
                    .await;
            assert_eq!(quality.map(|q| q.is_connected), Ok(true));
        }
        assert_eq!(transport.gets(), vec!["https://x.test/models?key=k"; 3]);
    }

    #[tokio::test]
    async fn other_outcomes_mean_disconnected() {
        let transport = ScriptedTransport::new();
        transport
            .push_get(status(503))
            .push_get(Err(TransportError::ConnectionRefused("refused".into())));
        let cancel = CancellationToken::new();
        for _ in 0..2 {
            let quality =
                check_connectivity(&transport, "https://x.test", "k", Duration::from_secs(5), &cancel)
                    .await;
            assert_eq!(quality, Ok(NetworkQuality::disconnected()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_responses_are_classed_poor() {
        let transport = SlowTransport(Duration::from_millis(800));
        let cancel = CancellationToken::new();
        let quality =
            check_connectivity(&transport, "https://x.test", "k", Duration::from_secs(5), &cancel)
                .await;
        let quality = match quality {
            Ok(q) => q,
            Err(e) => panic!("unexpected error: {e}"),
        };
        assert_eq!(quality.quality, ConnectionQuality::Poor);
        assert_eq!(quality.latency_ms, Some(800));
    }

    struct SlowTransport(Duration);

    #[async_trait::async_trait]
    impl Transport for SlowTransport {
        async fn post(
            &self,
            _url: &str,
            _body: &serde_json::Value,
            _timeout: Duration,
        ) -> Result<crate::transport::HttpResponse, TransportError> {
            Err(TransportError::Other("unused".into()))
        }

        async fn get(
            &self,
            _url: &str,
            _timeout: Duration,
        ) -> Result<crate::transport::HttpResponse, TransportError> {
            tokio::time::sleep(self.0).await;
            status(200)
        }
    }
}
