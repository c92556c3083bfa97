//! Integration tests for configuration and the assembled dashboard

use async_trait::async_trait;
use pulse_dash::config::Config;
use pulse_dash::dashboard::Dashboard;
use pulse_dash::feed::{PriceFeed, PushConnector, Quote, QuoteError, QuoteSource, RetryPolicy};
use pulse_dash::metric::{MetricConfig, SimulatedMetric};
use pulse_dash::ws::WsMessage;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[test]
fn test_example_config_matches_defaults() {
    let config = Config::from_toml(include_str!("../config.toml.example")).unwrap();
    let defaults = Config::default();

    assert_eq!(config.feed.rest_url, defaults.feed.rest_url);
    assert_eq!(config.feed.ws_url, defaults.feed.ws_url);
    assert_eq!(config.feed.retry_policy(), defaults.feed.retry_policy());
    assert_eq!(config.metrics.coffee, defaults.metrics.coffee);
    assert_eq!(config.metrics.sms, defaults.metrics.sms);
    assert_eq!(
        config.metrics.coffee.to_metric_config("coffee"),
        MetricConfig::coffee()
    );
}

struct FixedSource;

#[async_trait]
impl QuoteSource for FixedSource {
    async fn fetch_quote(&self) -> Result<Quote, QuoteError> {
        Ok(Quote {
            price: dec!(50000),
            change_percent_24h: dec!(-1.5),
        })
    }
}

/// Connections that open and then stay silent
struct SilentConnector {
    held: std::sync::Mutex<Vec<mpsc::Sender<WsMessage>>>,
}

impl PushConnector for SilentConnector {
    fn connect(&self) -> mpsc::Receiver<WsMessage> {
        let (tx, rx) = mpsc::channel(4);
        let _ = tx.try_send(WsMessage::Connected);
        self.held.lock().unwrap().push(tx);
        rx
    }
}

#[tokio::test(start_paused = true)]
async fn test_dashboard_renders_all_cards() {
    let price = PriceFeed::new(
        Arc::new(FixedSource),
        Arc::new(SilentConnector {
            held: Default::default(),
        }),
        RetryPolicy::default(),
    );
    let coffee = SimulatedMetric::new(MetricConfig::coffee()).unwrap();
    let sms = SimulatedMetric::new(MetricConfig::sms()).unwrap();
    let mut dashboard = Dashboard::new(price, coffee, sms);

    let frame = dashboard.render();
    assert!(frame.lines().next().unwrap().ends_with("loading..."));

    dashboard.start();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    dashboard.changed().await;

    let cards = dashboard.cards();
    assert_eq!(cards[0].value, "50,000.00");
    assert_eq!(cards[0].percentage_change, dec!(-1.5));
    assert!(cards[0].error.is_none());
    assert_ne!(cards[1].value, "2,000,000,000");
    assert!(cards[1].percentage_change > dec!(0));
    assert_ne!(cards[2].value, "8,000,000,000,000");

    let frame = dashboard.render();
    assert_eq!(frame.lines().count(), 3);
    assert!(frame.contains("$50,000.00"));
    assert!(frame.contains("▼ -1.50%"));
    assert!(frame.contains(" cups"));
    assert!(frame.contains(" messages"));

    dashboard.stop();
    dashboard.stop();
}
