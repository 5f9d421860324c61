//! ALTILI: budget-constrained coupon optimizer for pick-six pools.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod backtest;
pub mod config;
pub mod optimizer;
pub mod report;
pub mod source;
pub mod storage;
pub mod strategy;
pub mod types;

pub use optimizer::{optimize, CouponPlan, LegSelection, Optimizer, Policy};
pub use types::{Candidate, CouponError, Difficulty, Leg, LegConstraint, Race, RaceCard};
