//! Data models for the storage layer

use crate::cli::types::{CategoryMap, OwnerCode, Season, TeamId, Week};
use serde::{Deserialize, Serialize};

/// Team metadata for one season, as recorded by the league bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeason {
    pub season: Season,
    pub team_id: TeamId,
    pub team_name: String,
    pub owner_code: Option<OwnerCode>,
}

/// Raw category totals for one team in one week.
///
/// Write-once input from ingestion. A `None` value means the provider did not
/// supply that category (typically an in-progress week).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTeamStat {
    pub season: Season,
    pub week: Week,
    pub team_id: TeamId,
    pub values: CategoryMap<Option<f64>>,
    pub completed: bool,
}

/// The scheduled head-to-head pairing for one week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMatchup {
    pub season: Season,
    pub week: Week,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl ScheduledMatchup {
    /// The opponent of `team` in this matchup, if `team` played in it.
    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        if self.home_team_id == team {
            Some(self.away_team_id)
        } else if self.away_team_id == team {
            Some(self.home_team_id)
        } else {
            None
        }
    }

    /// The two team ids, lower first.
    pub fn ordered_pair(&self) -> (TeamId, TeamId) {
        if self.home_team_id <= self.away_team_id {
            (self.home_team_id, self.away_team_id)
        } else {
            (self.away_team_id, self.home_team_id)
        }
    }
}

/// Everything the engine needs to compute one season, loaded in one pass
#[derive(Debug, Clone, Default)]
pub struct SeasonData {
    pub season: Season,
    pub teams: Vec<TeamSeason>,
    pub stats: Vec<WeeklyTeamStat>,
    pub matchups: Vec<ScheduledMatchup>,
}

impl SeasonData {
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Bulk import document accepted by `import` (one file, any number of seasons)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueImport {
    #[serde(default)]
    pub teams: Vec<TeamSeason>,
    #[serde(default)]
    pub stats: Vec<WeeklyTeamStat>,
    #[serde(default)]
    pub matchups: Vec<ScheduledMatchup>,
}
