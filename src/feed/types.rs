//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single observed Bitcoin price
///
/// Snapshots are never mutated; each observation replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// Price in USD
    pub price: Decimal,
    /// Percent change against the previous observation (or 24h change for
    /// REST quotes)
    pub percentage_change: Decimal,
    /// Local timestamp when the observation was accepted
    pub observed_at: DateTime<Utc>,
}

/// Quote returned by the one-shot REST request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub price: Decimal,
    pub change_percent_24h: Decimal,
}

/// Connection state of a price feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Initial fetch or first subscription in progress
    Connecting,
    /// Subscription open and accepting messages
    Live,
    /// Waiting for or performing reconnect attempt `attempt`
    Reconnecting { attempt: u32 },
    /// No further automatic recovery
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Live => write!(f, "live"),
            ConnectionState::Reconnecting { attempt } => write!(f, "reconnecting ({})", attempt),
            ConnectionState::Failed => write!(f, "failed"),
        }
    }
}

/// User-visible feed errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeedError {
    /// Initial (or reconnect) price fetch failed
    #[error("Unable to fetch price data. Please try again later.")]
    FetchFailed,
    /// Transport error on the subscription; reconnect pending
    #[error("Connection issues. Attempting to reconnect...")]
    ConnectionIssues,
    /// Retry budget spent
    #[error("Connection lost. Please refresh the page.")]
    ConnectionLost,
}

/// Why a REST quote could not be obtained
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Transport or decode failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-success status code
    #[error("Unexpected status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    /// Body was not the expected JSON shape
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A numeric field did not hold a usable number
    #[error("Invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Everything the presentation layer needs about the price feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedView {
    /// Last known price (zero until the first successful fetch)
    pub price: Decimal,
    /// Price formatted for display
    pub value: String,
    pub percentage_change: Decimal,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<String>,
    /// True until the first fetch has completed
    pub loading: bool,
    pub state: ConnectionState,
}

impl Default for FeedView {
    fn default() -> Self {
        Self {
            price: Decimal::ZERO,
            value: crate::format::group_thousands(Decimal::ZERO, 2),
            percentage_change: Decimal::ZERO,
            last_update: None,
            error: None,
            loading: true,
            state: ConnectionState::Connecting,
        }
    }
}
