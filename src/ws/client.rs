//! Single-connection WebSocket client with ping keepalive

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// WebSocket client that opens one connection per `connect` call
///
/// Reconnection policy is left to the caller: every connection reports its
/// lifecycle as [`WsMessage`] events and ends with `Disconnected`.
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Open a connection and return a receiver for its events
    ///
    /// Dropping the receiver closes the socket.
    pub fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(self.config.buffer_size);
        let config = self.config.clone();

        tokio::spawn(async move {
            Self::run_connection(config, tx).await;
        });

        rx
    }

    async fn run_connection(config: WsConfig, tx: mpsc::Sender<WsMessage>) {
        match Self::connect_and_stream(&config, &tx).await {
            Ok(()) => {
                tracing::info!(url = %config.url, "WebSocket connection closed");
            }
            Err(e) => {
                tracing::warn!(url = %config.url, error = %e, "WebSocket transport error");
                let _ = tx.send(WsMessage::Error(e.to_string())).await;
            }
        }

        let _ = tx.send(WsMessage::Disconnected).await;
    }

    /// Connect to WebSocket and stream messages until close, error or
    /// receiver drop
    async fn connect_and_stream(
        config: &WsConfig,
        tx: &mpsc::Sender<WsMessage>,
    ) -> Result<(), WsError> {
        tracing::info!(url = %config.url, "Connecting to WebSocket");

        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        let (mut write, mut read) = ws_stream.split();

        tracing::info!("WebSocket connected");

        if tx.send(WsMessage::Connected).await.is_err() {
            return Ok(());
        }

        let mut ping_interval = interval_at(
            Instant::now() + config.ping_interval,
            config.ping_interval,
        );
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if tx.send(WsMessage::Text(text)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                let _ = write.send(Message::Close(None)).await;
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Binary(data))) => {
                            if tx.send(WsMessage::Binary(data)).await.is_err() {
                                tracing::debug!("Receiver dropped, closing connection");
                                let _ = write.send(Message::Close(None)).await;
                                return Ok(());
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::SendFailed(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Ok(());
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Err(WsError::ConnectionFailed(e.to_string()));
                        }
                        None => {
                            return Err(WsError::ConnectionFailed("Stream ended unexpectedly".into()));
                        }
                    }
                }

                _ = tx.closed() => {
                    tracing::debug!("Receiver dropped, closing connection");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(());
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::PongTimeout);
                    }
                    write.send(Message::Ping(Vec::new())).await
                        .map_err(|e| WsError::SendFailed(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_ws_client_creation() {
        let client = WsClient::with_url("wss://example.com");
        assert_eq!(client.url(), "wss://example.com");
    }

    #[test]
    fn test_ws_client_with_config() {
        let config = WsConfig::new("wss://test.com").ping_interval(Duration::from_secs(15));

        let client = WsClient::new(config);
        assert_eq!(client.url(), "wss://test.com");
        assert_eq!(client.config.ping_interval, Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_ws_client_connection_failure() {
        // Nothing listens on port 1, so the handshake fails right away
        let client = WsClient::with_url("ws://127.0.0.1:1");
        let mut rx = client.connect();

        let events = tokio::time::timeout(Duration::from_secs(5), async {
            let mut events = Vec::new();
            while let Some(msg) = rx.recv().await {
                events.push(msg);
            }
            events
        })
        .await
        .expect("Test timed out");

        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], WsMessage::Error(_)));
        assert_eq!(events[1], WsMessage::Disconnected);
    }
}
