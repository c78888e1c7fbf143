//! PostHog analytics sink.
//!
//! Implements `AnalyticsSink` from `engram-core` against a
//! PostHog-compatible capture endpoint. Delivery is fire-and-forget: each
//! capture posts from a spawned task, and failures are logged at warn --
//! never propagated to the memory subsystem.
//!
//! When no API key is configured the sink is a no-op.

use std::time::Duration;

use serde_json::json;
use uuid::Uuid;

use engram_core::telemetry::AnalyticsSink;
use engram_types::config::AnalyticsConfig;
use engram_types::telemetry::AnalyticsEvent;

/// PostHog-compatible analytics sink.
pub struct PostHogSink {
    inner: Option<Inner>,
}

struct Inner {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl PostHogSink {
    /// Create a sink from the analytics configuration.
    ///
    /// An absent API key yields a disabled (no-op) sink.
    pub fn new(config: &AnalyticsConfig) -> Self {
        let inner = config.api_key.as_ref().map(|api_key| Inner {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("failed to create reqwest client"),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.clone(),
        });

        if inner.is_none() {
            tracing::debug!("Analytics disabled (no API key configured)");
        }

        Self { inner }
    }

    /// Whether events will actually be delivered.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }
}

impl AnalyticsSink for PostHogSink {
    async fn capture(&self, user_id: Uuid, event: AnalyticsEvent, properties: serde_json::Value) {
        let Some(inner) = &self.inner else {
            return;
        };

        let payload = json!({
            "api_key": inner.api_key,
            "event": event.name(),
            "distinct_id": user_id,
            "properties": properties,
        });
        let client = inner.client.clone();
        let url = format!("{}/capture/", inner.endpoint);

        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    tracing::warn!(status = %resp.status(), event = %payload["event"], "Analytics capture rejected");
                }
                Err(e) => {
                    tracing::warn!(error = %e, event = %payload["event"], "Analytics capture failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_api_key() {
        let sink = PostHogSink::new(&AnalyticsConfig::default());
        assert!(!sink.is_enabled());
    }

    #[test]
    fn test_enabled_with_api_key_and_trimmed_endpoint() {
        let config = AnalyticsConfig {
            api_key: Some("phc_test".to_string()),
            endpoint: "https://eu.i.posthog.com/".to_string(),
        };
        let sink = PostHogSink::new(&config);
        assert!(sink.is_enabled());
        assert_eq!(
            sink.inner.as_ref().unwrap().endpoint,
            "https://eu.i.posthog.com"
        );
    }

    #[tokio::test]
    async fn test_disabled_capture_is_noop() {
        let sink = PostHogSink::new(&AnalyticsConfig::default());
        sink.capture(
            Uuid::now_v7(),
            AnalyticsEvent::MemoryDeleted,
            json!({"project_id": "p"}),
        )
        .await;
    }
}
