//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section is optional; anything left out falls back to the
//! standard coupon settings, so an empty file is a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::optimizer::{Policy, DEFAULT_TOLERANCE, DEFAULT_UNIT_PRICE};
use crate::strategy::chaos::ChaosConfig;
use crate::strategy::CouponStrategy;
use crate::types::CouponError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub coupon: CouponSettings,
    pub policy: Policy,
    pub chaos: ChaosConfig,
    pub strategies: Vec<StrategyConfig>,
}

/// Pool-wide coupon settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CouponSettings {
    pub unit_price: f64,
    pub tolerance: f64,
    /// Number of legs on a coupon (the last N races of the card).
    pub legs: usize,
}

impl Default for CouponSettings {
    fn default() -> Self {
        Self {
            unit_price: DEFAULT_UNIT_PRICE,
            tolerance: DEFAULT_TOLERANCE,
            legs: 6,
        }
    }
}

/// One `[[strategies]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct StrategyConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub calm_budget: f64,
    pub chaos_budget: f64,
    /// Named policy preset (`standard` | `wide`).
    #[serde(default)]
    pub preset: Option<String>,
    /// Inline policy; wins over `preset`.
    #[serde(default)]
    pub policy: Option<Policy>,
}

impl StrategyConfig {
    /// Resolve into a strategy, falling back to `base` for the policy.
    pub fn to_strategy(&self, base: &Policy) -> Result<CouponStrategy, CouponError> {
        for budget in [self.calm_budget, self.chaos_budget] {
            if !(budget.is_finite() && budget > 0.0) {
                return Err(CouponError::Config(format!(
                    "strategy {} needs positive budgets, got {budget}",
                    self.id
                )));
            }
        }
        let policy = match (&self.policy, &self.preset) {
            (Some(policy), _) => policy.clone(),
            (None, Some(name)) => Policy::preset(name).ok_or_else(|| {
                CouponError::Config(format!("strategy {}: unknown preset {name}", self.id))
            })?,
            (None, None) => base.clone(),
        };
        policy.validate()?;
        Ok(CouponStrategy {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            calm_budget: self.calm_budget,
            chaos_budget: self.chaos_budget,
            policy,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the optimizer would refuse anyway, at load time.
    pub fn validate(&self) -> Result<(), CouponError> {
        if !(self.coupon.unit_price.is_finite() && self.coupon.unit_price > 0.0) {
            return Err(CouponError::InvalidUnitPrice(self.coupon.unit_price));
        }
        if !(self.coupon.tolerance.is_finite() && self.coupon.tolerance >= 0.0) {
            return Err(CouponError::InvalidTolerance(self.coupon.tolerance));
        }
        if self.coupon.legs == 0 {
            return Err(CouponError::Config("coupon.legs must be at least 1".into()));
        }
        self.policy.validate()?;
        self.resolve_strategies().map(|_| ())
    }

    /// Configured strategies, or the built-in pair when none are listed.
    pub fn resolve_strategies(&self) -> Result<Vec<CouponStrategy>, CouponError> {
        if self.strategies.is_empty() {
            return Ok(CouponStrategy::defaults());
        }
        self.strategies
            .iter()
            .map(|s| s.to_strategy(&self.policy))
            .collect()
    }
}
