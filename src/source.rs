//! Race card sources.
//!
//! Defines the `CardSource` trait the planner pulls scored cards from and
//! a JSON-file implementation. Scraping and model scoring happen upstream;
//! by the time a card reaches a source every runner already has a score.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::debug;

use crate::types::RaceCard;

/// Abstraction over wherever scored race cards come from.
#[cfg_attr(test, mockall::automock)]
pub trait CardSource {
    /// Load the card identified by `key` (a path, a `venue/date`, ...).
    fn load(&self, key: &str) -> Result<RaceCard>;
}

/// Reads cards from JSON files, `key` being a path relative to `base_dir`.
#[derive(Debug, Clone, Default)]
pub struct JsonCardSource {
    base_dir: Option<PathBuf>,
}

impl JsonCardSource {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(key),
            None => PathBuf::from(key),
        }
    }
}

impl CardSource for JsonCardSource {
    fn load(&self, key: &str) -> Result<RaceCard> {
        let path = self.path_for(key);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read race card: {}", path.display()))?;
        let card: RaceCard = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse race card: {}", path.display()))?;
        debug!(path = %path.display(), card = %card, "Race card loaded");
        Ok(card)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
