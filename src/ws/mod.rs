//! WebSocket client library
//!
//! Provides a WebSocket client that reports each connection's lifecycle as a
//! stream of events, with ping/pong keepalive.

mod client;
mod types;

pub use client::WsClient;
pub use types::{WsConfig, WsError, WsMessage};
