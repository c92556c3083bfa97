//! Simulated metric types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration for one simulated counter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricConfig {
    /// Short identifier used in logs and metrics labels
    pub name: String,
    /// Starting magnitude
    pub initial_value: Decimal,
    /// Smallest per-tick increase (inclusive)
    pub min_increase: Decimal,
    /// Largest per-tick increase (exclusive, unless equal to `min_increase`)
    pub max_increase: Decimal,
    /// Tick period
    pub update_interval: Duration,
}

impl MetricConfig {
    /// Global coffee consumption, in cups
    pub fn coffee() -> Self {
        Self {
            name: "coffee".to_string(),
            initial_value: dec!(2000000000),
            min_increase: dec!(1000),
            max_increase: dec!(5000),
            update_interval: Duration::from_millis(2000),
        }
    }

    /// SMS messages sent worldwide
    pub fn sms() -> Self {
        Self {
            name: "sms".to_string(),
            initial_value: dec!(8000000000000),
            min_increase: dec!(500000),
            max_increase: dec!(1000000),
            update_interval: Duration::from_millis(1000),
        }
    }

    /// Check the bounds are usable
    pub fn validate(&self) -> Result<(), MetricError> {
        if self.min_increase <= Decimal::ZERO {
            return Err(MetricError::NonPositiveIncrease(self.min_increase));
        }
        if self.max_increase < self.min_increase {
            return Err(MetricError::InvertedRange {
                min: self.min_increase,
                max: self.max_increase,
            });
        }
        if self.initial_value < Decimal::ZERO {
            return Err(MetricError::NegativeInitial(self.initial_value));
        }
        if self.update_interval.is_zero() {
            return Err(MetricError::ZeroInterval);
        }
        Ok(())
    }
}

/// One observation of a simulated counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    /// Cumulative value, never decreasing
    pub raw_value: Decimal,
    pub display_value: String,
    /// Percent change against the value before the last tick
    pub percentage_change: Decimal,
    pub observed_at: DateTime<Utc>,
}

/// Metric configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("min_increase must be positive, got {0}")]
    NonPositiveIncrease(Decimal),
    #[error("max_increase {max} is below min_increase {min}")]
    InvertedRange { min: Decimal, max: Decimal },
    #[error("initial_value must not be negative, got {0}")]
    NegativeInitial(Decimal),
    #[error("update_interval must be non-zero")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(MetricConfig::coffee().validate().is_ok());
        assert!(MetricConfig::sms().validate().is_ok());
        assert_eq!(MetricConfig::sms().update_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut config = MetricConfig::coffee();
        config.min_increase = Decimal::ZERO;
        assert_eq!(
            config.validate(),
            Err(MetricError::NonPositiveIncrease(Decimal::ZERO))
        );

        let mut config = MetricConfig::coffee();
        config.max_increase = dec!(10);
        assert!(matches!(
            config.validate(),
            Err(MetricError::InvertedRange { .. })
        ));

        let mut config = MetricConfig::coffee();
        config.initial_value = dec!(-1);
        assert_eq!(config.validate(), Err(MetricError::NegativeInitial(dec!(-1))));

        let mut config = MetricConfig::coffee();
        config.update_interval = Duration::ZERO;
        assert_eq!(config.validate(), Err(MetricError::ZeroInterval));
    }

    #[test]
    fn test_degenerate_range_is_valid() {
        let mut config = MetricConfig::coffee();
        config.max_increase = config.min_increase;
        assert!(config.validate().is_ok());
    }
}
