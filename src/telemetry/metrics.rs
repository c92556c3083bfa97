//! Prometheus metrics

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Push frames that produced a price update
    MessagesAccepted,
    /// Push frames dropped as malformed or out of state
    MessagesDropped,
    /// Reconnect attempts scheduled
    Reconnects,
    /// REST quote requests that failed
    FetchFailures,
    /// Simulated metric ticks
    MetricTicks,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Last accepted BTC price
    BtcPrice,
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            CounterMetric::MessagesAccepted => "pulse_feed_messages_accepted_total",
            CounterMetric::MessagesDropped => "pulse_feed_messages_dropped_total",
            CounterMetric::Reconnects => "pulse_feed_reconnects_total",
            CounterMetric::FetchFailures => "pulse_feed_fetch_failures_total",
            CounterMetric::MetricTicks => "pulse_metric_ticks_total",
        }
    }
}

/// Increment a counter by one
pub fn increment_counter(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::BtcPrice => "pulse_btc_price_usd",
    };

    ::metrics::gauge!(metric_name).set(value);
}

/// Publish a simulated metric's current value
pub fn set_metric_value(name: &str, value: Decimal) {
    ::metrics::gauge!("pulse_simulated_metric_value", "metric" => name.to_string())
        .set(value.to_f64().unwrap_or(0.0));
}
