//! Display formatting for dashboard values

use chrono::{DateTime, Local, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a value with comma thousands separators and a fixed number of
/// fraction digits, e.g. `50000` with 2 decimals -> `"50,000.00"`
pub fn group_thousands(value: Decimal, decimals: u32) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimals as usize, rounded.abs());

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(text.len() + int_part.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }

    grouped
}

/// Default display for simulated counters: whole units, grouped
pub fn whole_units(value: Decimal) -> String {
    group_thousands(value.floor(), 0)
}

/// Signed percentage with two decimals, e.g. `"+1.00%"`
pub fn percentage(change: Decimal) -> String {
    let rounded = change.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.2}%", rounded)
    } else {
        format!("+{:.2}%", rounded.abs())
    }
}

/// Wall-clock time of an observation in the local timezone
pub fn clock_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_group_thousands_price() {
        assert_eq!(group_thousands(dec!(50000), 2), "50,000.00");
        assert_eq!(group_thousands(dec!(50500.126), 2), "50,500.13");
        assert_eq!(group_thousands(dec!(999.995), 2), "1,000.00");
    }

    #[test]
    fn test_group_thousands_small_values() {
        assert_eq!(group_thousands(dec!(0), 2), "0.00");
        assert_eq!(group_thousands(dec!(7), 0), "7");
        assert_eq!(group_thousands(dec!(123), 0), "123");
        assert_eq!(group_thousands(dec!(1234), 0), "1,234");
    }

    #[test]
    fn test_group_thousands_negative() {
        assert_eq!(group_thousands(dec!(-1234567.5), 1), "-1,234,567.5");
        assert_eq!(group_thousands(dec!(-0.001), 2), "0.00");
    }

    #[test]
    fn test_whole_units_floors() {
        assert_eq!(whole_units(dec!(2000001234.99)), "2,000,001,234");
        assert_eq!(whole_units(dec!(8000000000000)), "8,000,000,000,000");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(dec!(1)), "+1.00%");
        assert_eq!(percentage(dec!(2.5)), "+2.50%");
        assert_eq!(percentage(dec!(-0.456)), "-0.46%");
        assert_eq!(percentage(dec!(-0.001)), "+0.00%");
    }

    #[test]
    fn test_clock_time_empty() {
        assert_eq!(clock_time(None), "");
        assert_eq!(clock_time(Some(Utc::now())).len(), 8);
    }
}
