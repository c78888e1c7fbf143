//! Global configuration types for Engram.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! HTTP bind address, background extraction pool sizing, and the product
//! analytics sink.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Engram service.
///
/// Loaded from `~/.engram/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            extraction: ExtractionConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

/// HTTP server bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Background extraction pool sizing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Maximum queued extraction tasks before new submissions are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Maximum extraction tasks running concurrently.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_queue_capacity() -> usize {
    256
}

fn default_max_concurrent() -> usize {
    4
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Product analytics sink settings.
///
/// When `api_key` is absent the sink is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_analytics_endpoint")]
    pub endpoint: String,
}

fn default_analytics_endpoint() -> String {
    "https://us.i.posthog.com".to_string()
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_analytics_endpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.extraction.queue_capacity, 256);
        assert_eq!(config.extraction.max_concurrent, 4);
        assert!(config.analytics.api_key.is_none());
    }

    #[test]
    fn test_app_config_deserialize_empty() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8090);
        assert_eq!(config.extraction.max_concurrent, 4);
    }

    #[test]
    fn test_app_config_deserialize_with_values() {
        let toml_str = r#"
[server]
host = "0.0.0.0"
port = 9000

[extraction]
max_concurrent = 8

[analytics]
api_key = "phc_test"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.extraction.max_concurrent, 8);
        assert_eq!(config.extraction.queue_capacity, 256);
        assert_eq!(config.analytics.api_key.as_deref(), Some("phc_test"));
    }
}
