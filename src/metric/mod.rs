//! Simulated metrics
//!
//! Monotonically growing counters advanced by a random increase on a fixed
//! timer, with a percent change derived on every tick.

mod series;
mod ticker;
mod types;

pub use series::{Formatter, MetricSeries};
pub use ticker::SimulatedMetric;
pub use types::{MetricConfig, MetricError, MetricSnapshot};
