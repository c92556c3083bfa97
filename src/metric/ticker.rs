//! Timer-driven simulated metric

use super::series::{Formatter, MetricSeries};
use super::types::{MetricConfig, MetricError, MetricSnapshot};
use crate::gate::Gate;
use crate::telemetry::{increment_counter, set_metric_value, CounterMetric};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Simulated counter ticking on its own timer
///
/// The series is moved into the timer task on `start`; nothing else can
/// read or write the raw value. Ticks are strictly sequential and each one
/// is applied and published without yielding, so `stop` never observes a
/// half-applied tick.
pub struct SimulatedMetric {
    name: String,
    series: Option<MetricSeries>,
    view_tx: Arc<watch::Sender<MetricSnapshot>>,
    gate: Gate,
    task: Option<JoinHandle<()>>,
}

impl SimulatedMetric {
    /// Create a metric; it does not tick until `start`
    pub fn new(config: MetricConfig) -> Result<Self, MetricError> {
        Ok(Self::from_series(MetricSeries::new(config)?))
    }

    /// Create a metric with a custom display formatter
    pub fn with_formatter(config: MetricConfig, formatter: Formatter) -> Result<Self, MetricError> {
        Ok(Self::from_series(
            MetricSeries::new(config)?.with_formatter(formatter),
        ))
    }

    fn from_series(series: MetricSeries) -> Self {
        let (view_tx, _) = watch::channel(series.snapshot(Utc::now()));
        Self {
            name: series.config().name.clone(),
            series: Some(series),
            view_tx: Arc::new(view_tx),
            gate: Gate::new(),
            task: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receiver for snapshot updates
    pub fn subscribe(&self) -> watch::Receiver<MetricSnapshot> {
        self.view_tx.subscribe()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> MetricSnapshot {
        self.view_tx.borrow().clone()
    }

    /// Whether the timer is running
    pub fn is_running(&self) -> bool {
        self.task.is_some() && self.gate.is_open()
    }

    /// Start ticking every `update_interval`
    ///
    /// The first tick fires one interval after this call. No-op if already
    /// started or stopped.
    pub fn start(&mut self) {
        let Some(mut series) = self.series.take() else {
            tracing::debug!(metric = %self.name, "Metric already started or stopped");
            return;
        };
        if !self.gate.is_open() {
            return;
        }

        let period = series.config().update_interval;
        let name = self.name.clone();
        let tx = Arc::clone(&self.view_tx);
        let gate = self.gate.clone();

        tracing::info!(
            metric = %name,
            interval_ms = period.as_millis() as u64,
            initial = %series.current(),
            "Starting simulated metric"
        );

        self.task = Some(tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut timer = interval_at(Instant::now() + period, period);
            // late ticks are caught up one by one rather than merged
            timer.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                timer.tick().await;
                let snapshot = series.tick(&mut rng, Utc::now());
                if !publish_tick(&gate, &tx, &name, snapshot) {
                    return;
                }
            }
        }));
    }

    /// Cancel all future ticks; idempotent
    pub fn stop(&mut self) {
        let was_open = self.gate.close();
        self.series = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if was_open {
            tracing::info!(metric = %self.name, "Simulated metric stopped");
        }
    }
}

impl Drop for SimulatedMetric {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Publish one tick and its telemetry; nothing is recorded once the gate
/// has closed
fn publish_tick(
    gate: &Gate,
    tx: &watch::Sender<MetricSnapshot>,
    name: &str,
    snapshot: MetricSnapshot,
) -> bool {
    gate.publish(|| {
        increment_counter(CounterMetric::MetricTicks);
        set_metric_value(name, snapshot.raw_value);
        tracing::trace!(metric = %name, value = %snapshot.raw_value, "Metric tick");
        tx.send_replace(snapshot);
    })
}
