//! edgelab - analytics core for a backtest-results dashboard.
//!
//! Consumes the research backend's JSON artifacts (test runs and equity
//! curves) and produces the derived data the dashboard renders: underwater
//! drawdown series, filtered/sorted matrix views, and per
//! (strategy, symbol, timeframe) edge aggregates.

pub mod drawdown;
pub mod edges;
pub mod error;
pub mod logging;
pub mod model;
