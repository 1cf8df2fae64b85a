//! League Analytics Library
//!
//! Turns per-week, per-team category totals from a head-to-head, nine-category
//! fantasy basketball league into comparative analytics across one or many
//! seasons.
//!
//! ## Features
//!
//! - **Category Normalization**: weekly z-scores per category with a league-average baseline
//! - **Power Rankings**: weekly and season rankings with competition-style ties
//! - **Team History**: week-by-week trajectories with cumulative totals
//! - **Opponent Matrix**: multi-year head-to-head records with owner-era filtering
//! - **Luck vs Skill**: all-play expectations against actual matchup results
//! - **Awards**: best/worst weeks and seasons per category, plus luck awards
//! - **Aggregate Cache**: in-memory LRU in front of persisted SQLite aggregates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use league_analytics::{engine::AnalyticsEngine, storage::LeagueStore, Season};
//!
//! # fn example() -> league_analytics::Result<()> {
//! let store = LeagueStore::new()?;
//! let engine = AnalyticsEngine::with_defaults(store);
//!
//! for row in engine.season_power(Season::new(2024))? {
//!     println!("{} {} {:.2}", row.rank, row.team_name, row.avg_total_z);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export LEAGUE_ANALYTICS_DB=/path/to/league.db
//! export LEAGUE_ANALYTICS_AWARDS=best_week,worst_week,luckiest_season
//! ```

pub mod analytics;
pub mod cli;
pub mod commands;
pub mod core;
pub mod engine;
pub mod error;
pub mod storage;

// Re-export commonly used types
pub use cli::types::{Category, CategoryMap, OwnerCode, Season, TeamId, Week};
pub use engine::AnalyticsEngine;
pub use error::{AnalyticsError, Result};

/// Overrides the database location.
pub const DB_PATH_ENV_VAR: &str = "LEAGUE_ANALYTICS_DB";

/// Comma-separated award ids replacing the full catalog.
pub const AWARDS_ENV_VAR: &str = "LEAGUE_ANALYTICS_AWARDS";
