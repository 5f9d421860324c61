//! Backtesting: replay resolved cards through the coupon planner.

pub mod runner;

pub use runner::{BacktestReport, Backtester, CouponOutcome, ResolvedCard, StrategyStats};
