//! Head-to-head opponent matrix.
//!
//! Only weeks in which two teams were actually scheduled against each other
//! count. Each side of a matchup compares its category z-scores with the
//! opponent's: the higher z takes the category, equal is a tie, and the
//! signed difference is accumulated. The matchup itself goes to whoever won
//! more categories.
//!
//! Per-season records are what gets persisted; range queries merge them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::matchup::{self, MatchOutcome};
use super::SeasonFrame;
use crate::cli::types::{Category, CategoryMap, Season, TeamId};
use crate::error::{AnalyticsError, Result};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub diff_sum: f64,
}

impl CategoryCounts {
    fn add(&mut self, outcome: MatchOutcome, diff: f64) {
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Tie => self.ties += 1,
        }
        self.diff_sum += diff;
    }

    fn merge(&mut self, other: &CategoryCounts) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.ties += other.ties;
        self.diff_sum += other.diff_sum;
    }
}

/// One team's record against one opponent within one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentSeasonRecord {
    pub season: Season,
    pub team_id: TeamId,
    pub opponent_team_id: TeamId,
    /// Opponent's name in this season.
    pub opponent_name: String,
    pub matchups: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub categories: CategoryMap<CategoryCounts>,
}

impl OpponentSeasonRecord {
    fn new(season: Season, team_id: TeamId, opponent_team_id: TeamId, opponent_name: &str) -> Self {
        Self {
            season,
            team_id,
            opponent_team_id,
            opponent_name: opponent_name.to_string(),
            matchups: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            categories: CategoryMap::default(),
        }
    }

    fn add(&mut self, outcome: MatchOutcome, outcomes: &CategoryMap<MatchOutcome>, diffs: &CategoryMap<f64>) {
        self.matchups += 1;
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Tie => self.ties += 1,
        }
        for cat in Category::ALL {
            self.categories[cat].add(outcomes[cat], diffs[cat]);
        }
    }
}

/// Every team's per-opponent record for one season, ordered by
/// `(team_id, opponent_team_id)`.
pub fn season_records(frame: &SeasonFrame) -> Vec<OpponentSeasonRecord> {
    let mut records: BTreeMap<(TeamId, TeamId), OpponentSeasonRecord> = BTreeMap::new();

    for week in frame.completed_weeks() {
        for (home, away) in week.scored_pairings() {
            let tally = matchup::compare(&home.zscores, &away.zscores);
            let outcome = tally.outcome();

            records
                .entry((home.team_id, away.team_id))
                .or_insert_with(|| OpponentSeasonRecord::new(frame.season, home.team_id, away.team_id, &away.team_name))
                .add(outcome, &tally.outcomes, &tally.diffs);

            let flipped = tally.outcomes.map(|_, o| o.flip());
            let negated = tally.diffs.map(|_, d| -d);
            records
                .entry((away.team_id, home.team_id))
                .or_insert_with(|| OpponentSeasonRecord::new(frame.season, away.team_id, home.team_id, &home.team_name))
                .add(outcome.flip(), &flipped, &negated);
        }
    }

    records.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_pct: f64,
    pub avg_diff: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub matchups: u32,
    pub win_pct: f64,
}

/// One team's merged record against one opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentRecord {
    pub team_id: TeamId,
    pub opponent_team_id: TeamId,
    pub opponent_name: String,
    pub overall: OverallRecord,
    pub categories: CategoryMap<CategoryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentMatrix {
    pub team_id: TeamId,
    pub min_season: Season,
    pub max_season: Season,
    pub owner_era_only: bool,
    pub rows: Vec<OpponentRecord>,
}

/// Reject `min > max` before any work happens.
pub fn validate_range(min: Season, max: Season) -> Result<()> {
    if min > max {
        return Err(AnalyticsError::InvalidYearRange {
            min: min.as_u16(),
            max: max.as_u16(),
        });
    }
    Ok(())
}

fn win_pct(wins: u32, ties: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        (wins as f64 + 0.5 * ties as f64) / games as f64
    }
}

struct Merged {
    name: (Season, String),
    matchups: u32,
    wins: u32,
    losses: u32,
    ties: u32,
    categories: CategoryMap<CategoryCounts>,
}

/// Merge `team_id`'s per-season records into one row per opponent.
///
/// `current_name` supplies the opponent's most recent name; when it has none,
/// the name from the latest merged season is used. Rows are sorted by
/// opponent name, then opponent id.
pub fn merge<'a>(
    team_id: TeamId,
    records: impl IntoIterator<Item = &'a OpponentSeasonRecord>,
    current_name: impl Fn(TeamId) -> Option<String>,
) -> Vec<OpponentRecord> {
    let mut merged: BTreeMap<TeamId, Merged> = BTreeMap::new();

    for record in records.into_iter().filter(|r| r.team_id == team_id && r.matchups > 0) {
        let entry = merged.entry(record.opponent_team_id).or_insert_with(|| Merged {
            name: (record.season, record.opponent_name.clone()),
            matchups: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            categories: CategoryMap::default(),
        });
        if record.season > entry.name.0 {
            entry.name = (record.season, record.opponent_name.clone());
        }
        entry.matchups += record.matchups;
        entry.wins += record.wins;
        entry.losses += record.losses;
        entry.ties += record.ties;
        for cat in Category::ALL {
            entry.categories[cat].merge(&record.categories[cat]);
        }
    }

    let mut rows: Vec<OpponentRecord> = merged
        .into_iter()
        .map(|(opponent_team_id, m)| {
            let n = m.matchups;
            OpponentRecord {
                team_id,
                opponent_team_id,
                opponent_name: current_name(opponent_team_id).unwrap_or(m.name.1),
                overall: OverallRecord {
                    wins: m.wins,
                    losses: m.losses,
                    ties: m.ties,
                    matchups: n,
                    win_pct: win_pct(m.wins, m.ties, n),
                },
                categories: m.categories.map(|_, c| CategoryRecord {
                    wins: c.wins,
                    losses: c.losses,
                    ties: c.ties,
                    win_pct: win_pct(c.wins, c.ties, n),
                    avg_diff: c.diff_sum / n as f64,
                }),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.opponent_name
            .cmp(&b.opponent_name)
            .then(a.opponent_team_id.cmp(&b.opponent_team_id))
    });
    rows
}
