//! Card chaos score.
//!
//! A rough 0–100 indicator of how likely a meeting is to throw up
//! surprises, from field sizes, venue, and card length. Strategies use it
//! to shift budget between favourite-led and surprise coupons.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::RaceCard;

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Points per runner of average field size.
    pub field_weight: f64,
    /// Venues whose results tend to be volatile (substring match).
    pub volatile_venues: Vec<String>,
    pub volatile_bonus: f64,
    /// Cards with more races than this get `long_card_bonus`.
    pub long_card_races: usize,
    pub long_card_bonus: f64,
    /// Score above which a card counts as chaotic.
    pub threshold: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            field_weight: 2.0,
            volatile_venues: ["Adana", "Şanlıurfa", "Diyarbakır", "Elazığ", "Kocaeli"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            volatile_bonus: 5.0,
            long_card_races: 7,
            long_card_bonus: 3.0,
            threshold: 35.0,
        }
    }
}

/// Chaos score for a card plus whether it crosses the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChaosReading {
    pub score: f64,
    pub chaotic: bool,
}

pub struct ChaosGauge {
    config: ChaosConfig,
}

impl ChaosGauge {
    pub fn new(config: ChaosConfig) -> Self {
        Self { config }
    }

    /// Score a card.
    pub fn read(&self, card: &RaceCard) -> ChaosReading {
        let mut score = card.avg_field_size() * self.config.field_weight;

        if self
            .config
            .volatile_venues
            .iter()
            .any(|v| card.venue.contains(v.as_str()))
        {
            score += self.config.volatile_bonus;
        }

        if card.races.len() > self.config.long_card_races {
            score += self.config.long_card_bonus;
        }

        let chaotic = score > self.config.threshold;
        debug!(
            venue = %card.venue,
            score = format!("{:.1}", score),
            chaotic,
            "Chaos score"
        );

        ChaosReading { score, chaotic }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
