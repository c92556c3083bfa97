//! Terminal dashboard: one price feed and two simulated counters
//!
//! Renders whatever the producers publish; holds no state of its own beyond
//! the watch receivers.

use crate::config::Config;
use crate::feed::{FeedView, PriceFeed};
use crate::format;
use crate::metric::{MetricSnapshot, SimulatedMetric};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::watch;

/// Uniform card shape consumed by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub title: String,
    pub value: String,
    pub percentage_change: Decimal,
    pub last_update: String,
    pub error: Option<String>,
    #[serde(skip)]
    prefix: &'static str,
    #[serde(skip)]
    suffix: &'static str,
    #[serde(skip)]
    loading: bool,
}

impl CardView {
    /// Card for the Bitcoin price
    pub fn from_feed(view: &FeedView) -> Self {
        Self {
            title: "Bitcoin Price".to_string(),
            value: view.value.clone(),
            percentage_change: view.percentage_change,
            last_update: format::clock_time(view.last_update),
            error: view.error.clone(),
            prefix: "$",
            suffix: "",
            loading: view.loading,
        }
    }

    /// Card for a simulated counter
    pub fn from_metric(title: &str, suffix: &'static str, snapshot: &MetricSnapshot) -> Self {
        Self {
            title: title.to_string(),
            value: snapshot.display_value.clone(),
            percentage_change: snapshot.percentage_change,
            last_update: format::clock_time(Some(snapshot.observed_at)),
            error: None,
            prefix: "",
            suffix,
            loading: false,
        }
    }

    /// One line of text for this card
    pub fn render(&self) -> String {
        if self.loading {
            return format!("{:<26} loading...", self.title);
        }
        if let Some(error) = &self.error {
            return format!("{:<26} ! {}", self.title, error);
        }

        let trend = if self.percentage_change >= Decimal::ZERO {
            "▲"
        } else {
            "▼"
        };
        format!(
            "{:<26} {}{}{}  {} {}  (updated {})",
            self.title,
            self.prefix,
            self.value,
            self.suffix,
            trend,
            format::percentage(self.percentage_change),
            self.last_update
        )
    }
}

/// All three producers plus their view receivers
pub struct Dashboard {
    price: PriceFeed,
    coffee: SimulatedMetric,
    sms: SimulatedMetric,
    price_rx: watch::Receiver<FeedView>,
    coffee_rx: watch::Receiver<MetricSnapshot>,
    sms_rx: watch::Receiver<MetricSnapshot>,
}

impl Dashboard {
    /// Assemble a dashboard from already-built producers
    pub fn new(price: PriceFeed, coffee: SimulatedMetric, sms: SimulatedMetric) -> Self {
        let price_rx = price.subscribe();
        let coffee_rx = coffee.subscribe();
        let sms_rx = sms.subscribe();
        Self {
            price,
            coffee,
            sms,
            price_rx,
            coffee_rx,
            sms_rx,
        }
    }

    /// Build the CoinCap feed and the configured counters
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let price = PriceFeed::coincap(&config.feed)?;
        let coffee = SimulatedMetric::new(config.metrics.coffee.to_metric_config("coffee"))?;
        let sms = SimulatedMetric::new(config.metrics.sms.to_metric_config("sms"))?;
        Ok(Self::new(price, coffee, sms))
    }

    /// Start all producers
    pub fn start(&mut self) {
        self.price.start();
        self.coffee.start();
        self.sms.start();
    }

    /// Tear down all producers; idempotent
    pub fn stop(&mut self) {
        self.price.stop();
        self.coffee.stop();
        self.sms.stop();
    }

    /// Wait until any producer publishes
    pub async fn changed(&mut self) {
        tokio::select! {
            _ = self.price_rx.changed() => {}
            _ = self.coffee_rx.changed() => {}
            _ = self.sms_rx.changed() => {}
        }
    }

    /// Current cards, marking everything seen
    pub fn cards(&mut self) -> [CardView; 3] {
        [
            CardView::from_feed(&self.price_rx.borrow_and_update()),
            CardView::from_metric(
                "Global Coffee Consumption",
                " cups",
                &self.coffee_rx.borrow_and_update(),
            ),
            CardView::from_metric(
                "SMS Messages Sent",
                " messages",
                &self.sms_rx.borrow_and_update(),
            ),
        ]
    }

    /// Render all cards as lines of text
    pub fn render(&mut self) -> String {
        self.cards()
            .iter()
            .map(CardView::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
