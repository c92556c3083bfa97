//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Channel buffer size for inbound events
    pub buffer_size: usize,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            ping_interval: Duration::from_secs(30),
            buffer_size: 1024,
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set inbound channel capacity
    pub fn buffer_size(mut self, n: usize) -> Self {
        self.buffer_size = n.max(1);
        self
    }
}

/// Events delivered by a single WebSocket connection
///
/// A connection always ends with exactly one `Disconnected`. A transport
/// failure is reported as `Error` immediately before it, and `Connected` is
/// only sent if the handshake succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
    /// Connection established
    Connected,
    /// Transport-level failure; the connection is being torn down
    Error(String),
    /// Connection closed
    Disconnected,
}

/// WebSocket errors
#[derive(Debug, Clone, Error)]
pub enum WsError {
    /// Connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Peer stopped answering pings
    #[error("Pong timeout")]
    PongTimeout,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_config_default() {
        let config = WsConfig::default();
        assert!(config.url.is_empty());
        assert_eq!(config.ping_interval, Duration::from_secs(30));
        assert_eq!(config.buffer_size, 1024);
    }

    #[test]
    fn test_ws_config_builder() {
        let config = WsConfig::new("wss://example.com")
            .ping_interval(Duration::from_secs(15))
            .buffer_size(0);

        assert_eq!(config.url, "wss://example.com");
        assert_eq!(config.ping_interval, Duration::from_secs(15));
        assert_eq!(config.buffer_size, 1);
    }

    #[test]
    fn test_ws_error_display() {
        let err = WsError::ConnectionFailed("timeout".to_string());
        assert_eq!(err.to_string(), "Connection failed: timeout");

        assert_eq!(WsError::PongTimeout.to_string(), "Pong timeout");
    }
}
