//! Pure analytics over loaded league data.
//!
//! Everything in here is synchronous arithmetic over in-memory collections;
//! loading and persisting happens in [`crate::engine`].
//!
//! - `normalize`: weekly category z-scores
//! - `power`: weekly and season power rankings
//! - `history`: per-team week-by-week trajectories
//! - `owners`: cross-season owner continuity
//! - `opponents`: head-to-head opponent matrix
//! - `luck`: all-play records and luck index
//! - `standings`: season W-L-T table from scheduled games
//! - `awards`: award catalog and winner selection

pub mod awards;
pub mod history;
pub mod luck;
pub mod matchup;
pub mod normalize;
pub mod opponents;
pub mod owners;
pub mod power;
pub mod standings;

use std::collections::{BTreeSet, HashMap};

use crate::{
    cli::types::{Season, TeamId},
    storage::models::{ScheduledMatchup, SeasonData},
};
use luck::TeamWeekLuck;
use normalize::{CategoryZRow, WeekZScores};

/// One normalized week plus the luck inputs derived from it
#[derive(Debug, Clone)]
pub struct WeekFrame {
    pub zscores: WeekZScores,
    pub luck: Vec<TeamWeekLuck>,
    pub matchups: Vec<ScheduledMatchup>,
}

impl WeekFrame {
    /// Scheduled games where both teams have a row, as `(home, away)`.
    ///
    /// A pairing listed from both sides is one game; self-pairings are dropped.
    pub fn scored_pairings(&self) -> Vec<(&CategoryZRow, &CategoryZRow)> {
        let mut seen: BTreeSet<(TeamId, TeamId)> = BTreeSet::new();
        self.matchups
            .iter()
            .filter(|m| m.home_team_id != m.away_team_id && seen.insert(m.ordered_pair()))
            .filter_map(|m| Some((self.zscores.row(m.home_team_id)?, self.zscores.row(m.away_team_id)?)))
            .collect()
    }
}

/// A season normalized once, shared by every per-season aggregate
#[derive(Debug, Clone)]
pub struct SeasonFrame {
    pub season: Season,
    pub weeks: Vec<WeekFrame>,
}

impl SeasonFrame {
    pub fn build(data: &SeasonData) -> Self {
        let names = team_names(data);
        let weeks = normalize::normalize_season(data.season, &data.stats, &names)
            .into_iter()
            .map(|mut zscores| {
                let matchups: Vec<ScheduledMatchup> = data
                    .matchups
                    .iter()
                    .filter(|m| m.week == zscores.week)
                    .copied()
                    .collect();
                luck::flag_missing_rows(&mut zscores, &matchups);
                let luck = luck::evaluate_week(&zscores, &matchups);
                WeekFrame {
                    zscores,
                    luck,
                    matchups,
                }
            })
            .collect();

        Self {
            season: data.season,
            weeks,
        }
    }

    /// Weeks whose every row is flagged completed.
    pub fn completed_weeks(&self) -> impl Iterator<Item = &WeekFrame> {
        self.weeks.iter().filter(|w| w.zscores.complete)
    }
}

/// Team-name lookup for one season.
pub fn team_names(data: &SeasonData) -> HashMap<TeamId, String> {
    data.teams
        .iter()
        .map(|t| (t.team_id, t.team_name.clone()))
        .collect()
}
