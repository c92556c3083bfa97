//! Connection state machine for the price feed
//!
//! Pure bookkeeping: no I/O and no timers. The driver feeds it events
//! (quote results, socket open/close/error, text frames) and performs the
//! [`Action`] each transition hands back. Keeping the retry counter and the
//! price baseline here makes every transition testable without a network.

use super::coincap::parse_push_price;
use super::types::{ConnectionState, FeedError, FeedView, PriceSnapshot, Quote, QuoteError};
use crate::format;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

/// Reconnect attempts allowed before the feed gives up
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Fixed delay before each reconnect attempt
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Linear retry budget: fixed delay, hard ceiling, no jitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub reconnect_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

/// What the driver must do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Request the REST quote
    Fetch,
    /// Open the push subscription
    Subscribe,
    /// Sleep, then call [`FeedMachine::on_reconnect_due`]
    Wait(Duration),
    /// Nothing left to do until teardown
    Idle,
}

/// Price feed state owned by a single driver task
#[derive(Debug, Clone)]
pub struct FeedMachine {
    policy: RetryPolicy,
    state: ConnectionState,
    retries: u32,
    /// Last accepted price, the baseline for the next percent change
    baseline: Option<Decimal>,
    snapshot: Option<PriceSnapshot>,
    error: Option<FeedError>,
    loading: bool,
}

impl FeedMachine {
    /// Create a machine in `Connecting` with the given retry budget
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Connecting,
            retries: 0,
            baseline: None,
            snapshot: None,
            error: None,
            loading: true,
        }
    }

    /// First action of a freshly started feed
    pub fn begin(&mut self) -> Action {
        self.state = ConnectionState::Connecting;
        Action::Fetch
    }

    /// Apply the outcome of a REST quote request
    ///
    /// A zero price from a re-fetch never replaces the last-known price.
    pub fn on_quote(&mut self, result: Result<Quote, QuoteError>, now: DateTime<Utc>) -> Action {
        if self.state == ConnectionState::Failed {
            return Action::Idle;
        }
        self.loading = false;

        match result {
            Ok(quote) if quote.price.is_zero() && self.snapshot.is_some() => {
                // Keep the last-known price and baseline; still resubscribe
                tracing::warn!("Ignoring zero price from quote re-fetch");
                Action::Subscribe
            }
            Ok(quote) => {
                self.baseline = Some(quote.price);
                self.snapshot = Some(PriceSnapshot {
                    price: quote.price,
                    percentage_change: quote.change_percent_24h,
                    observed_at: now,
                });
                Action::Subscribe
            }
            Err(e) => {
                tracing::error!(error = %e, "Price fetch failed");
                self.error = Some(FeedError::FetchFailed);
                self.state = ConnectionState::Failed;
                Action::Idle
            }
        }
    }

    /// Subscription opened
    pub fn on_open(&mut self) {
        if self.state == ConnectionState::Failed {
            return;
        }
        self.state = ConnectionState::Live;
        self.error = None;
        self.retries = 0;
    }

    /// Handle one inbound text frame
    ///
    /// Returns the new snapshot if the frame carried a usable price. Frames
    /// that do not are dropped without touching any state.
    pub fn on_message(&mut self, text: &str, now: DateTime<Utc>) -> Option<PriceSnapshot> {
        if self.state != ConnectionState::Live {
            tracing::debug!(state = %self.state, "Ignoring frame outside live state");
            return None;
        }

        let price = match parse_push_price(text) {
            Ok(price) => price,
            Err(e) => {
                tracing::debug!(error = %e, frame = text, "Dropping push frame");
                return None;
            }
        };

        let previous_change = self
            .snapshot
            .as_ref()
            .map(|s| s.percentage_change)
            .unwrap_or(Decimal::ZERO);
        let percentage_change = match self.baseline {
            Some(prev) if prev > Decimal::ZERO => (price - prev)
                .checked_div(prev)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(previous_change),
            _ => previous_change,
        };

        let snapshot = PriceSnapshot {
            price,
            percentage_change,
            observed_at: now,
        };
        self.baseline = Some(price);
        self.snapshot = Some(snapshot.clone());
        self.error = None;

        Some(snapshot)
    }

    /// Transport-level error; the socket is about to close
    pub fn on_transport_error(&mut self) {
        if self.state == ConnectionState::Failed {
            return;
        }
        self.error = Some(FeedError::ConnectionIssues);
    }

    /// Subscription closed (cleanly, by error, or never opened)
    pub fn on_close(&mut self) -> Action {
        if self.state == ConnectionState::Failed {
            return Action::Idle;
        }

        if self.retries < self.policy.max_retries {
            self.retries += 1;
            self.state = ConnectionState::Reconnecting {
                attempt: self.retries,
            };
            Action::Wait(self.policy.reconnect_delay)
        } else {
            self.state = ConnectionState::Failed;
            self.error = Some(FeedError::ConnectionLost);
            Action::Idle
        }
    }

    /// Reconnect delay elapsed: start the full acquisition again
    pub fn on_reconnect_due(&mut self) -> Action {
        match self.state {
            ConnectionState::Reconnecting { .. } => Action::Fetch,
            _ => Action::Idle,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive reconnect attempts since the last successful open
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn snapshot(&self) -> Option<&PriceSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<FeedError> {
        self.error
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Presentation view of the current state
    pub fn view(&self) -> FeedView {
        let price = self
            .snapshot
            .as_ref()
            .map(|s| s.price)
            .unwrap_or(Decimal::ZERO);

        FeedView {
            price,
            value: format::group_thousands(price, 2),
            percentage_change: self
                .snapshot
                .as_ref()
                .map(|s| s.percentage_change)
                .unwrap_or(Decimal::ZERO),
            last_update: self.snapshot.as_ref().map(|s| s.observed_at),
            error: self.error.map(|e| e.to_string()),
            loading: self.loading,
            state: self.state,
        }
    }
}

impl Default for FeedMachine {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}
