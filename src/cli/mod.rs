//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use types::{AwardMode, AwardScopeKind, OwnerCode, RebuildKind, Season, TeamId, Week};

use crate::DB_PATH_ENV_VAR;

/// Season range shared by multi-year commands
#[derive(Debug, Args)]
pub struct SeasonRange {
    /// First season (inclusive).
    #[clap(long)]
    pub min: Option<Season>,

    /// Last season (inclusive).
    #[clap(long)]
    pub max: Option<Season>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank every team for one week by total z-score
    WeekPower {
        #[clap(long, short)]
        season: Season,

        #[clap(long, short)]
        week: Week,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Per-category z-scores for one week, including the league-average row
    WeekZscores {
        #[clap(long, short)]
        season: Season,

        #[clap(long, short)]
        week: Week,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Category z-scores for every week of a season
    SeasonZscores {
        #[clap(long, short)]
        season: Season,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Matchup and category W-L-T standings over completed weeks
    Standings {
        #[clap(long, short)]
        season: Season,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Season power ranking over completed weeks
    SeasonPower {
        #[clap(long, short)]
        season: Season,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// One team's week-by-week trajectory for a season
    TeamHistory {
        #[clap(long, short)]
        season: Season,

        #[clap(long, short)]
        team_id: TeamId,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Head-to-head record against every opponent across seasons.
    ///
    /// Defaults to every season with data when the range is omitted.
    OpponentMatrix {
        #[clap(long, short)]
        team_id: TeamId,

        #[clap(flatten)]
        range: SeasonRange,

        /// Only seasons in the team's current owner era.
        #[clap(long)]
        owner_era_only: bool,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Best and worst weeks, seasons and luck
    Awards {
        #[clap(long, value_enum, default_value_t = AwardScopeKind::League)]
        scope: AwardScopeKind,

        #[clap(long, value_enum, default_value_t = AwardMode::Summary)]
        mode: AwardMode,

        /// A single season; all-time when omitted.
        #[clap(long, short)]
        season: Option<Season>,

        /// Team for `--scope team`.
        #[clap(long, short)]
        team_id: Option<TeamId>,

        /// Owner code for `--scope owner`.
        #[clap(long, short)]
        owner: Option<OwnerCode>,

        /// Only seasons in the current owner era.
        #[clap(long)]
        owner_era_only: bool,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Recompute and replace materialized aggregates
    Rebuild {
        #[clap(value_enum, default_value_t = RebuildKind::All)]
        kind: RebuildKind,

        /// A single season; conflicts with --min/--max.
        #[clap(long, short, conflicts_with_all = ["min", "max"])]
        season: Option<Season>,

        #[clap(flatten)]
        range: SeasonRange,

        /// Rebuild even when an aggregate already exists.
        #[clap(long)]
        force: bool,

        /// Output results as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },

    /// Load teams, weekly stats and matchups from a JSON file
    Import {
        file: PathBuf,

        /// Force-rebuild every aggregate for the imported seasons.
        #[clap(long)]
        rebuild: bool,

        /// Output results as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "league-analytics",
    about = "Analytics for head-to-head category fantasy leagues"
)]
pub struct LeagueCli {
    /// SQLite database path (or set `LEAGUE_ANALYTICS_DB`).
    #[clap(long, global = true, env = DB_PATH_ENV_VAR)]
    pub db: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}
