//! Configuration types for pulse-dash

use crate::feed::{RetryPolicy, COINCAP_REST_URL, COINCAP_WS_URL};
use crate::metric::MetricConfig;
use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub metrics: MetricsConfig,
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// REST endpoint for the initial quote
    pub rest_url: String,
    /// Push stream endpoint
    pub ws_url: String,
    /// Reconnect attempts before giving up
    pub max_retries: u32,
    /// Fixed delay before each reconnect attempt
    pub reconnect_delay_ms: u64,
    /// Timeout for the REST request (none by default)
    pub request_timeout_secs: Option<u64>,
    /// WebSocket keepalive ping interval
    pub ping_interval_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            rest_url: COINCAP_REST_URL.to_string(),
            ws_url: COINCAP_WS_URL.to_string(),
            max_retries: 3,
            reconnect_delay_ms: 3000,
            request_timeout_secs: None,
            ping_interval_secs: 30,
        }
    }
}

impl FeedConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs.max(1))
    }
}

/// Simulated metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "MetricSettings::coffee")]
    pub coffee: MetricSettings,
    #[serde(default = "MetricSettings::sms")]
    pub sms: MetricSettings,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            coffee: MetricSettings::coffee(),
            sms: MetricSettings::sms(),
        }
    }
}

/// One simulated counter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricSettings {
    pub initial_value: Decimal,
    pub min_increase: Decimal,
    pub max_increase: Decimal,
    pub update_interval_ms: u64,
}

impl MetricSettings {
    fn coffee() -> Self {
        Self::from(&MetricConfig::coffee())
    }

    fn sms() -> Self {
        Self::from(&MetricConfig::sms())
    }

    /// Runtime configuration for the metric called `name`
    pub fn to_metric_config(&self, name: &str) -> MetricConfig {
        MetricConfig {
            name: name.to_string(),
            initial_value: self.initial_value,
            min_increase: self.min_increase,
            max_increase: self.max_increase,
            update_interval: Duration::from_millis(self.update_interval_ms),
        }
    }
}

impl From<&MetricConfig> for MetricSettings {
    fn from(config: &MetricConfig) -> Self {
        Self {
            initial_value: config.initial_value,
            min_increase: config.min_increase,
            max_increase: config.max_increase,
            update_interval_ms: config.update_interval.as_millis() as u64,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Serve Prometheus metrics on this port when set
    pub metrics_port: Option<u16>,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
