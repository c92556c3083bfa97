//! Tick arithmetic for a simulated counter

use super::types::{MetricConfig, MetricError, MetricSnapshot};
use crate::format;
use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Fraction digits kept on each random increase
const DELTA_SCALE: u32 = 6;

/// Maps a raw value to its display string
pub type Formatter = Arc<dyn Fn(Decimal) -> String + Send + Sync>;

/// Monotonic series advanced one tick at a time
pub struct MetricSeries {
    config: MetricConfig,
    current: Decimal,
    /// Value before the most recent tick's update; baseline for the next one
    previous: Decimal,
    percentage_change: Decimal,
    formatter: Formatter,
}

impl MetricSeries {
    /// Create a series at `initial_value` using whole-unit formatting
    pub fn new(config: MetricConfig) -> Result<Self, MetricError> {
        config.validate()?;
        Ok(Self {
            current: config.initial_value,
            previous: config.initial_value,
            percentage_change: Decimal::ZERO,
            formatter: Arc::new(format::whole_units),
            config,
        })
    }

    /// Replace the display formatter
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    pub fn current(&self) -> Decimal {
        self.current
    }

    /// Draw an increase from `[min_increase, max_increase)`
    pub fn draw_delta<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
        let min = self.config.min_increase;
        let max = self.config.max_increase;
        if max <= min {
            return min;
        }

        let fraction = Decimal::from_f64(rng.gen::<f64>()).unwrap_or(Decimal::ZERO);
        // largest value on the rounding grid that stays below max
        let ceiling = max - Decimal::new(1, DELTA_SCALE);
        (min + (max - min) * fraction)
            .round_dp(DELTA_SCALE)
            .min(ceiling)
            .max(min)
    }

    /// Advance by a random increase
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> MetricSnapshot {
        let delta = self.draw_delta(rng);
        self.advance(delta, now)
    }

    /// Advance by a given increase
    ///
    /// The percent change is measured against the value before this tick.
    pub fn advance(&mut self, delta: Decimal, now: DateTime<Utc>) -> MetricSnapshot {
        let new_value = self.current + delta;

        self.percentage_change = if self.previous.is_zero() {
            Decimal::ZERO
        } else {
            (new_value - self.previous)
                .checked_div(self.previous)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .unwrap_or(Decimal::ZERO)
        };
        self.current = new_value;
        self.previous = new_value;

        self.snapshot(now)
    }

    /// Current state as a snapshot stamped `now`
    pub fn snapshot(&self, now: DateTime<Utc>) -> MetricSnapshot {
        MetricSnapshot {
            raw_value: self.current,
            display_value: (self.formatter)(self.current),
            percentage_change: self.percentage_change,
            observed_at: now,
        }
    }
}

impl fmt::Debug for MetricSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricSeries")
            .field("config", &self.config)
            .field("current", &self.current)
            .field("percentage_change", &self.percentage_change)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn fixed_config() -> MetricConfig {
        MetricConfig {
            name: "fixed".to_string(),
            initial_value: dec!(100),
            min_increase: dec!(10),
            max_increase: dec!(10),
            update_interval: Duration::from_millis(1000),
        }
    }

    #[test]
    fn test_fixed_delta_tick() {
        let mut series = MetricSeries::new(fixed_config()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let snapshot = series.tick(&mut rng, Utc::now());
        assert_eq!(snapshot.raw_value, dec!(110));
        assert_eq!(snapshot.percentage_change, dec!(10.00));
        assert_eq!(snapshot.display_value, "110");
    }

    #[test]
    fn test_change_uses_value_before_tick() {
        let mut series = MetricSeries::new(fixed_config()).unwrap();
        series.advance(dec!(10), Utc::now());
        let snapshot = series.advance(dec!(22), Utc::now());

        // (132 - 110) / 110 * 100
        assert_eq!(snapshot.raw_value, dec!(132));
        assert_eq!(snapshot.percentage_change, dec!(20));
    }

    #[test]
    fn test_initial_snapshot_has_zero_change() {
        let series = MetricSeries::new(MetricConfig::coffee()).unwrap();
        let snapshot = series.snapshot(Utc::now());
        assert_eq!(snapshot.raw_value, dec!(2000000000));
        assert_eq!(snapshot.percentage_change, Decimal::ZERO);
        assert_eq!(snapshot.display_value, "2,000,000,000");
    }

    #[test]
    fn test_zero_start_has_zero_change() {
        let mut config = fixed_config();
        config.initial_value = Decimal::ZERO;
        let mut series = MetricSeries::new(config).unwrap();

        let first = series.advance(dec!(10), Utc::now());
        assert_eq!(first.percentage_change, Decimal::ZERO);
        let second = series.advance(dec!(10), Utc::now());
        assert_eq!(second.percentage_change, dec!(100));
    }

    #[test]
    fn test_increase_stays_in_bounds() {
        let config = MetricConfig::sms();
        let (min, max) = (config.min_increase, config.max_increase);
        let mut series = MetricSeries::new(config).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let mut last = series.current();
        for _ in 0..1_000 {
            let snapshot = series.tick(&mut rng, Utc::now());
            let delta = snapshot.raw_value - last;
            assert!(delta >= min, "delta {delta} below {min}");
            assert!(delta < max, "delta {delta} not below {max}");
            assert!(snapshot.percentage_change > Decimal::ZERO);
            last = snapshot.raw_value;
        }
    }

    #[test]
    fn test_draw_near_max_stays_below_max() {
        let mut config = fixed_config();
        config.min_increase = dec!(1);
        config.max_increase = dec!(2);
        let series = MetricSeries::new(config).unwrap();

        // all-ones bits draw the largest f64 below 1.0
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(series.draw_delta(&mut high), dec!(1.999999));

        let mut low = StepRng::new(0, 0);
        assert_eq!(series.draw_delta(&mut low), dec!(1));
    }

    #[test]
    fn test_custom_formatter() {
        let series = MetricSeries::new(fixed_config())
            .unwrap()
            .with_formatter(Arc::new(|v| format!("{v} units")));
        assert_eq!(series.snapshot(Utc::now()).display_value, "100 units");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = fixed_config();
        config.max_increase = dec!(5);
        assert!(MetricSeries::new(config).is_err());
    }
}
