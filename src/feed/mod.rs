//! Price feed module
//!
//! Live Bitcoin price: one REST quote, then the CoinCap push stream, with a
//! bounded reconnect budget.

mod coincap;
mod driver;
mod machine;
mod types;

pub use coincap::{
    parse_push_price, parse_quote_body, CoinCapClient, PushFrameError, COINCAP_REST_URL,
    COINCAP_WS_URL,
};
pub use driver::PriceFeed;
pub use machine::{Action, FeedMachine, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_RECONNECT_DELAY};
pub use types::{ConnectionState, FeedError, FeedView, PriceSnapshot, Quote, QuoteError};

use crate::ws::WsMessage;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of the one-shot price quote
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the current price and its 24h change
    async fn fetch_quote(&self) -> Result<Quote, QuoteError>;
}

/// Opens push subscriptions
pub trait PushConnector: Send + Sync {
    /// Open one connection; its events end with `WsMessage::Disconnected`
    /// and dropping the receiver closes it
    fn connect(&self) -> mpsc::Receiver<WsMessage>;
}
