//! pulse-dash: personal terminal dashboard
//!
//! This library provides the core components for:
//! - A live Bitcoin price: one CoinCap REST quote, then the CoinCap
//!   WebSocket stream with a bounded reconnect budget
//! - Simulated counters (coffee, SMS) that grow on fixed timers
//! - A text renderer for the uniform card shape both produce
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod feed;
pub mod format;
pub mod gate;
pub mod metric;
pub mod telemetry;
pub mod ws;
