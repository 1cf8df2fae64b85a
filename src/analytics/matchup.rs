//! Head-to-head category comparison shared by all-play and the opponent matrix.

use serde::{Deserialize, Serialize};

use crate::cli::types::CategoryMap;

/// Result of one head-to-head matchup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Win,
    Loss,
    Tie,
}

impl MatchOutcome {
    /// Win = 1, tie = 0.5, loss = 0.
    pub fn score(self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Tie => 0.5,
            MatchOutcome::Loss => 0.0,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            MatchOutcome::Win => MatchOutcome::Loss,
            MatchOutcome::Loss => MatchOutcome::Win,
            MatchOutcome::Tie => MatchOutcome::Tie,
        }
    }

    fn from_diff(diff: f64) -> Self {
        if diff > 0.0 {
            MatchOutcome::Win
        } else if diff < 0.0 {
            MatchOutcome::Loss
        } else {
            MatchOutcome::Tie
        }
    }
}

/// Per-category outcomes of `team` against `opponent`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTally {
    pub outcomes: CategoryMap<MatchOutcome>,
    /// `team - opponent` per category.
    pub diffs: CategoryMap<f64>,
}

impl CategoryTally {
    pub fn wins(&self) -> u32 {
        self.count(MatchOutcome::Win)
    }

    pub fn losses(&self) -> u32 {
        self.count(MatchOutcome::Loss)
    }

    pub fn ties(&self) -> u32 {
        self.count(MatchOutcome::Tie)
    }

    /// Matchup result decided by count of categories won.
    pub fn outcome(&self) -> MatchOutcome {
        MatchOutcome::from_diff(self.wins() as f64 - self.losses() as f64)
    }

    fn count(&self, which: MatchOutcome) -> u32 {
        self.outcomes.values().filter(|o| **o == which).count() as u32
    }
}

/// Compare two teams category by category.
///
/// Values are compared as given; callers pass z-scores so that every
/// category is "higher is better" on a common scale.
pub fn compare(team: &CategoryMap<f64>, opponent: &CategoryMap<f64>) -> CategoryTally {
    let diffs = team.map(|cat, v| v - opponent[cat]);
    CategoryTally {
        outcomes: diffs.map(|_, d| MatchOutcome::from_diff(*d)),
        diffs,
    }
}
