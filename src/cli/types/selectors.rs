//! Enumerated selectors shared by the CLI and the engine API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which teams an awards query looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AwardScopeKind {
    League,
    Team,
    Owner,
}

impl fmt::Display for AwardScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AwardScopeKind::League => "league",
            AwardScopeKind::Team => "team",
            AwardScopeKind::Owner => "owner",
        };
        f.write_str(s)
    }
}

/// Whether awards fold all years together or report each year separately
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AwardMode {
    #[default]
    Summary,
    YearByYear,
}

impl fmt::Display for AwardMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AwardMode::Summary => "summary",
            AwardMode::YearByYear => "year_by_year",
        };
        f.write_str(s)
    }
}

/// Aggregate family (or families) a rebuild targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RebuildKind {
    SeasonPower,
    TeamHistory,
    OpponentMatrix,
    All,
}
