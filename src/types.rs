//! Shared types for the ALTILI coupon engine.
//!
//! These types form the data model used across all modules: the
//! optimizer works on `Leg`s of `Candidate`s, the planner on `RaceCard`s.
//! They carry no behaviour beyond cheap derived attributes so that the
//! optimizer, planner, and backtester can depend on them without
//! circular references.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A single runner in a leg, with the ranker's confidence score (0.0–1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub score: f64,
}

impl Candidate {
    pub fn new(id: impl Into<String>, score: f64) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3})", self.id, self.score)
    }
}

// ---------------------------------------------------------------------------
// Leg
// ---------------------------------------------------------------------------

/// One race of a multi-leg coupon.
///
/// Precondition: candidates are already sorted by descending score and
/// carry unique ids. The leg does not re-sort or re-validate; a caller that
/// breaks this gets prefix selections of whatever order it supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    candidates: Vec<Candidate>,
}

impl Leg {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    /// Build a leg from `(id, score)` pairs already in ranked order.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            candidates: pairs
                .into_iter()
                .map(|(id, score)| Candidate::new(id, score))
                .collect(),
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of runners in the leg.
    pub fn field_size(&self) -> usize {
        self.candidates.len()
    }

    /// Score of the ranked favourite, or 0 for an empty leg.
    pub fn top_score(&self) -> f64 {
        self.candidates.first().map(|c| c.score).unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The top-`count` candidates (clamped to the field size).
    pub fn prefix(&self, count: usize) -> &[Candidate] {
        &self.candidates[..count.min(self.candidates.len())]
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// How unpredictable a leg looks, driving its minimum coverage width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "EASY"),
            Difficulty::Normal => write!(f, "NORMAL"),
            Difficulty::Hard => write!(f, "HARD"),
        }
    }
}

/// Selection bounds for one leg: `0 <= min_count <= max_count <= field_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegConstraint {
    pub difficulty: Difficulty,
    pub min_count: usize,
    pub max_count: usize,
}

// ---------------------------------------------------------------------------
// Race card
// ---------------------------------------------------------------------------

/// One race on a meeting's programme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub number: u32,
    pub runners: Vec<Candidate>,
}

impl Race {
    /// Rank the runners into a `Leg`: stable sort by descending score, so
    /// equal scores keep programme order.
    pub fn to_leg(&self) -> Leg {
        let mut runners = self.runners.clone();
        runners.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Leg::new(runners)
    }
}

/// A full meeting: venue, date, and scored races.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceCard {
    pub venue: String,
    pub date: NaiveDate,
    pub races: Vec<Race>,
}

impl fmt::Display for RaceCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} races, {} runners)",
            self.venue,
            self.date,
            self.races.len(),
            self.races.iter().map(|r| r.runners.len()).sum::<usize>()
        )
    }
}

impl RaceCard {
    /// Mean number of runners per race (0 for an empty card).
    pub fn avg_field_size(&self) -> f64 {
        if self.races.is_empty() {
            return 0.0;
        }
        let runners: usize = self.races.iter().map(|r| r.runners.len()).sum();
        runners as f64 / self.races.len() as f64
    }

    /// Copy of the card with the named non-runners removed (case-insensitive).
    pub fn without_runners(&self, excluded: &[String]) -> RaceCard {
        if excluded.is_empty() {
            return self.clone();
        }
        let excluded: Vec<String> = excluded.iter().map(|e| e.to_uppercase()).collect();
        let races = self
            .races
            .iter()
            .map(|race| Race {
                number: race.number,
                runners: race
                    .runners
                    .iter()
                    .filter(|r| !excluded.contains(&r.id.to_uppercase()))
                    .cloned()
                    .collect(),
            })
            .collect();
        RaceCard {
            venue: self.venue.clone(),
            date: self.date,
            races,
        }
    }

    /// The last `count` races by race number, in running order.
    pub fn leg_races(&self, count: usize) -> Result<Vec<&Race>, CouponError> {
        if self.races.len() < count {
            return Err(CouponError::NotEnoughRaces {
                needed: count,
                found: self.races.len(),
            });
        }
        let mut races: Vec<&Race> = self.races.iter().collect();
        races.sort_by_key(|r| r.number);
        Ok(races.split_off(races.len() - count))
    }

    /// Ranked legs for the last `count` races.
    pub fn legs(&self, count: usize) -> Result<Vec<Leg>, CouponError> {
        Ok(self.leg_races(count)?.into_iter().map(Race::to_leg).collect())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for ALTILI.
#[derive(Debug, thiserror::Error)]
pub enum CouponError {
    #[error("Budget must be positive, got {0}")]
    InvalidBudget(f64),

    #[error("Unit price must be positive, got {0}")]
    InvalidUnitPrice(f64),

    #[error("Tolerance must be a non-negative fraction, got {0}")]
    InvalidTolerance(f64),

    #[error("Invalid selection policy: {0}")]
    InvalidPolicy(String),

    #[error("Not enough races for a coupon: need {needed}, found {found}")]
    NotEnoughRaces { needed: usize, found: usize },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
