//! CoinCap REST quote client and push frame parsing

use super::types::{Quote, QuoteError};
use super::{PushConnector, QuoteSource};
use crate::ws::{WsClient, WsMessage};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// CoinCap asset endpoint for Bitcoin
pub const COINCAP_REST_URL: &str = "https://api.coincap.io/v2/assets/bitcoin";

/// CoinCap price stream for Bitcoin
pub const COINCAP_WS_URL: &str = "wss://ws.coincap.io/prices?assets=bitcoin";

/// Field of the push frame holding the price
const PUSH_PRICE_FIELD: &str = "bitcoin";

/// `GET /v2/assets/{id}` response envelope
#[derive(Debug, Deserialize)]
struct AssetResponse {
    data: AssetData,
}

#[derive(Debug, Deserialize)]
struct AssetData {
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    #[serde(rename = "changePercent24Hr")]
    change_percent_24h: Option<String>,
}

/// Why a push frame was dropped
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushFrameError {
    #[error("invalid JSON")]
    InvalidJson,
    #[error("missing price field")]
    MissingField,
    #[error("non-numeric price: {0}")]
    NotNumeric(String),
    #[error("non-positive price: {0}")]
    NonPositive(Decimal),
}

/// Parse a decimal the way CoinCap encodes them (plain or scientific)
fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

fn required_number(field: &'static str, raw: Option<String>) -> Result<Decimal, QuoteError> {
    let raw = raw.unwrap_or_default();
    parse_decimal(&raw).ok_or(QuoteError::InvalidNumber { field, value: raw })
}

/// Parse the REST asset body into a quote
pub fn parse_quote_body(body: &str) -> Result<Quote, QuoteError> {
    let asset: AssetResponse = serde_json::from_str(body)?;

    let price = required_number("priceUsd", asset.data.price_usd)?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(QuoteError::InvalidNumber {
            field: "priceUsd",
            value: price.to_string(),
        });
    }
    let change_percent_24h = required_number("changePercent24Hr", asset.data.change_percent_24h)?;

    Ok(Quote {
        price,
        change_percent_24h,
    })
}

/// Extract the price from a push frame such as `{"bitcoin":"50500.12"}`
pub fn parse_push_price(text: &str) -> Result<Decimal, PushFrameError> {
    let frame: Value = serde_json::from_str(text).map_err(|_| PushFrameError::InvalidJson)?;

    let price = match frame.get(PUSH_PRICE_FIELD) {
        Some(Value::String(s)) => parse_decimal(s),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(other) => return Err(PushFrameError::NotNumeric(other.to_string())),
        None => return Err(PushFrameError::MissingField),
    };

    match price {
        Some(p) if p > Decimal::ZERO => Ok(p),
        Some(p) => Err(PushFrameError::NonPositive(p)),
        None => Err(PushFrameError::NotNumeric(frame[PUSH_PRICE_FIELD].to_string())),
    }
}

/// REST client for the one-shot quote
pub struct CoinCapClient {
    url: String,
    client: Client,
}

impl CoinCapClient {
    /// Create a client for the given asset URL
    ///
    /// Without a timeout a hung request keeps the feed loading indefinitely.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, QuoteError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            url: url.into(),
            client: builder.build()?,
        })
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and parse the current quote
    pub async fn fetch(&self) -> Result<Quote, QuoteError> {
        tracing::debug!(url = %self.url, "Fetching price quote");

        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteError::Status { status, body });
        }

        let body = response.text().await?;
        let quote = parse_quote_body(&body)?;

        tracing::info!(
            price = %quote.price,
            change_24h = %quote.change_percent_24h,
            "Fetched price quote"
        );

        Ok(quote)
    }
}

#[async_trait]
impl QuoteSource for CoinCapClient {
    async fn fetch_quote(&self) -> Result<Quote, QuoteError> {
        self.fetch().await
    }
}

impl PushConnector for WsClient {
    fn connect(&self) -> mpsc::Receiver<WsMessage> {
        WsClient::connect(self)
    }
}
