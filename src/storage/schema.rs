//! Database schema and connection management

use crate::cli::types::Category;
use crate::error::AnalyticsError;
use crate::DB_PATH_ENV_VAR;
use anyhow::Result;
use dirs::cache_dir;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// SQLite-backed store for source data and materialized aggregates
pub struct LeagueStore {
    pub(crate) conn: Connection,
}

impl LeagueStore {
    /// Open the default database (env override or the user cache dir)
    pub fn new() -> Result<Self> {
        Self::open(&Self::database_path()?)
    }

    /// Open (or create) a database at `path` and ensure tables exist
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Fresh in-memory database, used by tests and dry runs
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Path to the database file: `LEAGUE_ANALYTICS_DB` if set, otherwise
    /// `<cache dir>/league-analytics/league.db`
    pub fn database_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(DB_PATH_ENV_VAR) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }
        let cache_dir = cache_dir().ok_or_else(|| AnalyticsError::Cache {
            message: "Could not determine cache directory".to_string(),
        })?;
        Ok(cache_dir.join("league-analytics").join("league.db"))
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        let stat_columns: String = Category::ALL
            .iter()
            .map(|cat| format!("{} REAL,\n", stat_column(*cat)))
            .collect();

        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS team_seasons (
                season INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                team_name TEXT NOT NULL,
                owner_code TEXT,
                PRIMARY KEY (season, team_id)
            );

            CREATE TABLE IF NOT EXISTS weekly_team_stats (
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                {stat_columns}
                completed INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (season, week, team_id)
            );

            CREATE TABLE IF NOT EXISTS matchups (
                season INTEGER NOT NULL,
                week INTEGER NOT NULL,
                home_team_id INTEGER NOT NULL,
                away_team_id INTEGER NOT NULL,
                PRIMARY KEY (season, week, home_team_id, away_team_id)
            );

            CREATE INDEX IF NOT EXISTS idx_team_seasons_owner
                ON team_seasons(owner_code);"
        ))?;

        // Materialized aggregates. Rebuilt wholesale per season, never patched.
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS season_power_agg (
                season INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                team_name TEXT NOT NULL,
                rank INTEGER NOT NULL,
                weeks_played INTEGER NOT NULL,
                avg_total_z REAL NOT NULL,
                sum_total_z REAL NOT NULL,
                per_category_avg_z TEXT NOT NULL,
                per_category_rank TEXT NOT NULL,
                luck TEXT NOT NULL,
                PRIMARY KEY (season, team_id)
            );

            CREATE TABLE IF NOT EXISTS team_history_agg (
                season INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                team_name TEXT,
                week INTEGER NOT NULL,
                rank INTEGER NOT NULL,
                total_z REAL NOT NULL,
                cumulative_total_z REAL NOT NULL,
                league_average_total_z REAL NOT NULL,
                zscores TEXT NOT NULL,
                stats TEXT NOT NULL,
                league_average_zscores TEXT NOT NULL,
                PRIMARY KEY (season, team_id, week)
            );

            CREATE TABLE IF NOT EXISTS opponent_matrix_agg (
                season INTEGER NOT NULL,
                team_id INTEGER NOT NULL,
                opponent_team_id INTEGER NOT NULL,
                opponent_name TEXT NOT NULL,
                matchups INTEGER NOT NULL,
                wins INTEGER NOT NULL,
                losses INTEGER NOT NULL,
                ties INTEGER NOT NULL,
                categories TEXT NOT NULL,
                PRIMARY KEY (season, team_id, opponent_team_id)
            );

            CREATE TABLE IF NOT EXISTS aggregate_builds (
                family TEXT NOT NULL,
                season INTEGER NOT NULL,
                row_count INTEGER NOT NULL,
                built_at INTEGER NOT NULL,
                PRIMARY KEY (family, season)
            );",
        )?;

        Ok(())
    }
}

/// Column holding `cat` in `weekly_team_stats`
pub(crate) fn stat_column(cat: Category) -> &'static str {
    match cat {
        Category::FgPct => "fg_pct",
        Category::FtPct => "ft_pct",
        Category::ThreePm => "three_pm",
        Category::Reb => "reb",
        Category::Ast => "ast",
        Category::Stl => "stl",
        Category::Blk => "blk",
        Category::Dd => "dd",
        Category::Pts => "pts",
    }
}
