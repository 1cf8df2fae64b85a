//! Per-team week-by-week trajectory within a season.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{power, SeasonFrame};
use crate::cli::types::{CategoryMap, Season, TeamId, Week};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHistoryEntry {
    pub week: Week,
    pub rank: u32,
    pub total_z: f64,
    /// Running sum of `total_z` over this and every earlier entry.
    pub cumulative_total_z: f64,
    pub zscores: CategoryMap<f64>,
    pub stats: CategoryMap<f64>,
    pub league_average_total_z: f64,
    pub league_average_zscores: CategoryMap<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamHistory {
    pub season: Season,
    pub team_id: TeamId,
    /// `None` when the team has no completed week in the season.
    pub team_name: Option<String>,
    pub entries: Vec<TeamHistoryEntry>,
}

impl TeamHistory {
    pub fn empty(season: Season, team_id: TeamId) -> Self {
        Self {
            season,
            team_id,
            team_name: None,
            entries: Vec::new(),
        }
    }
}

/// Histories for every team that appears in a completed week, by team id.
///
/// Weeks a team has no row for are skipped, not interpolated.
pub fn build_all(frame: &SeasonFrame) -> Vec<TeamHistory> {
    let mut histories: BTreeMap<TeamId, TeamHistory> = BTreeMap::new();

    for week in frame.completed_weeks() {
        let ranks = power::week_ranks(&week.zscores);
        let average = week.zscores.league_average();

        for row in week.zscores.teams() {
            let history = histories
                .entry(row.team_id)
                .or_insert_with(|| TeamHistory::empty(frame.season, row.team_id));
            let previous = history
                .entries
                .last()
                .map(|e| e.cumulative_total_z)
                .unwrap_or(0.0);

            history.team_name = Some(row.team_name.clone());
            history.entries.push(TeamHistoryEntry {
                week: week.zscores.week,
                rank: ranks.get(&row.team_id).copied().unwrap_or(0),
                total_z: row.total_z,
                cumulative_total_z: previous + row.total_z,
                zscores: row.zscores,
                stats: row.stats,
                league_average_total_z: average.map(|a| a.total_z).unwrap_or(0.0),
                league_average_zscores: average.map(|a| a.zscores).unwrap_or_default(),
            });
        }
    }

    histories.into_values().collect()
}
