//! Async driver for the price feed state machine

use super::machine::{Action, FeedMachine, RetryPolicy};
use super::types::{FeedView, QuoteError};
use super::{CoinCapClient, PushConnector, QuoteSource};
use crate::config::FeedConfig;
use crate::gate::Gate;
use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};
use crate::ws::{WsClient, WsConfig, WsMessage};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Live price feed
///
/// Runs one task that owns the [`FeedMachine`], at most one subscription and
/// at most one reconnect timer. Observers read the latest [`FeedView`]
/// through [`PriceFeed::subscribe`].
pub struct PriceFeed {
    source: Arc<dyn QuoteSource>,
    connector: Arc<dyn PushConnector>,
    policy: RetryPolicy,
    view_tx: Arc<watch::Sender<FeedView>>,
    gate: Gate,
    task: Option<JoinHandle<()>>,
}

impl PriceFeed {
    /// Create a feed over arbitrary transports
    pub fn new(
        source: Arc<dyn QuoteSource>,
        connector: Arc<dyn PushConnector>,
        policy: RetryPolicy,
    ) -> Self {
        let (view_tx, _) = watch::channel(FeedView::default());
        Self {
            source,
            connector,
            policy,
            view_tx: Arc::new(view_tx),
            gate: Gate::new(),
            task: None,
        }
    }

    /// Create a feed backed by CoinCap REST and WebSocket endpoints
    pub fn coincap(config: &FeedConfig) -> Result<Self, QuoteError> {
        let source = CoinCapClient::new(&config.rest_url, config.request_timeout())?;
        let connector =
            WsClient::new(WsConfig::new(&config.ws_url).ping_interval(config.ping_interval()));

        Ok(Self::new(
            Arc::new(source),
            Arc::new(connector),
            config.retry_policy(),
        ))
    }

    /// Receiver for view updates
    pub fn subscribe(&self) -> watch::Receiver<FeedView> {
        self.view_tx.subscribe()
    }

    /// Latest published view
    pub fn view(&self) -> FeedView {
        self.view_tx.borrow().clone()
    }

    /// Whether the driver task has been started and not stopped
    pub fn is_running(&self) -> bool {
        self.task.is_some() && self.gate.is_open()
    }

    /// Begin acquisition: fetch the initial quote, then subscribe
    ///
    /// No-op if already started or stopped.
    pub fn start(&mut self) {
        if self.task.is_some() {
            tracing::debug!("Price feed already started");
            return;
        }
        if !self.gate.is_open() {
            tracing::warn!("Price feed was stopped, not restarting");
            return;
        }

        tracing::info!(
            max_retries = self.policy.max_retries,
            reconnect_delay_ms = self.policy.reconnect_delay.as_millis() as u64,
            "Starting price feed"
        );

        let publisher = Publisher {
            tx: Arc::clone(&self.view_tx),
            gate: self.gate.clone(),
        };
        let machine = FeedMachine::new(self.policy);
        let source = Arc::clone(&self.source);
        let connector = Arc::clone(&self.connector);

        self.task = Some(tokio::spawn(async move {
            run_feed(machine, source, connector, publisher).await;
        }));
    }

    /// Cancel any reconnect timer and close any subscription
    ///
    /// Idempotent. Once this returns no further view is published.
    pub fn stop(&mut self) {
        let was_open = self.gate.close();
        if let Some(task) = self.task.take() {
            // Dropping the task's future drops the subscription receiver,
            // which closes the socket.
            task.abort();
        }
        if was_open {
            tracing::info!("Price feed stopped");
        }
    }
}

impl Drop for PriceFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Gated publication of machine views
struct Publisher {
    tx: Arc<watch::Sender<FeedView>>,
    gate: Gate,
}

impl Publisher {
    fn publish(&self, machine: &FeedMachine) {
        let view = machine.view();
        self.gate.publish(|| {
            self.tx.send_replace(view);
        });
    }
}

/// Drive the machine until it goes idle
async fn run_feed(
    mut machine: FeedMachine,
    source: Arc<dyn QuoteSource>,
    connector: Arc<dyn PushConnector>,
    publisher: Publisher,
) {
    let mut action = machine.begin();
    publisher.publish(&machine);

    loop {
        action = match action {
            Action::Fetch => {
                let result = source.fetch_quote().await;
                if result.is_err() {
                    increment_counter(CounterMetric::FetchFailures);
                }
                let next = machine.on_quote(result, Utc::now());
                if let Some(snapshot) = machine.snapshot() {
                    set_gauge(GaugeMetric::BtcPrice, snapshot.price.to_f64().unwrap_or(0.0));
                }
                publisher.publish(&machine);
                next
            }
            Action::Subscribe => stream(&mut machine, connector.connect(), &publisher).await,
            Action::Wait(delay) => {
                increment_counter(CounterMetric::Reconnects);
                tracing::info!(
                    attempt = machine.retries(),
                    delay_ms = delay.as_millis() as u64,
                    "Price feed reconnect scheduled"
                );
                tokio::time::sleep(delay).await;
                machine.on_reconnect_due()
            }
            Action::Idle => {
                tracing::info!(
                    state = %machine.state(),
                    error = ?machine.error(),
                    "Price feed idle"
                );
                return;
            }
        };
    }
}

/// Pump one subscription's events into the machine until it closes
async fn stream(
    machine: &mut FeedMachine,
    mut events: mpsc::Receiver<WsMessage>,
    publisher: &Publisher,
) -> Action {
    while let Some(event) = events.recv().await {
        match event {
            WsMessage::Connected => {
                machine.on_open();
                tracing::info!("Price feed live");
                publisher.publish(machine);
            }
            WsMessage::Text(text) => match machine.on_message(&text, Utc::now()) {
                Some(snapshot) => {
                    increment_counter(CounterMetric::MessagesAccepted);
                    set_gauge(GaugeMetric::BtcPrice, snapshot.price.to_f64().unwrap_or(0.0));
                    tracing::trace!(price = %snapshot.price, "Price update");
                    publisher.publish(machine);
                }
                None => increment_counter(CounterMetric::MessagesDropped),
            },
            WsMessage::Binary(data) => {
                increment_counter(CounterMetric::MessagesDropped);
                tracing::debug!(len = data.len(), "Dropping binary frame");
            }
            WsMessage::Error(e) => {
                tracing::warn!(error = %e, "Price feed transport error");
                machine.on_transport_error();
                publisher.publish(machine);
            }
            WsMessage::Disconnected => break,
        }
    }

    let next = machine.on_close();
    tracing::warn!(state = %machine.state(), "Price feed subscription closed");
    publisher.publish(machine);
    next
}
