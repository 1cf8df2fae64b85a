//! Command implementations for the league analytics CLI

pub mod awards;
pub mod opponents;
pub mod rebuild;
pub mod season;
pub mod week;


use serde::Serialize;
use std::path::PathBuf;

use crate::{
    analytics::awards::AwardCatalog,
    core::CacheSettings,
    engine::AnalyticsEngine,
    storage::LeagueStore,
    Result, AWARDS_ENV_VAR,
};

/// Resolve the database path from the flag (which already honours the env var)
/// or the default cache location
pub fn resolve_db_path(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => Ok(LeagueStore::database_path()?),
    }
}

/// Parse a comma-separated award id list; `None` or blank means the full catalog
pub fn award_catalog_from(ids: Option<&str>) -> Result<AwardCatalog> {
    let Some(ids) = ids.filter(|s| !s.trim().is_empty()) else {
        return Ok(AwardCatalog::all());
    };
    let ids: Vec<&str> = ids
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    AwardCatalog::from_ids(&ids)
}

/// Award catalog from `LEAGUE_ANALYTICS_AWARDS`, validated up front
pub fn resolve_award_catalog() -> Result<AwardCatalog> {
    award_catalog_from(std::env::var(AWARDS_ENV_VAR).ok().as_deref())
}

/// Open the store and wrap it in an engine with the configured catalog
pub fn open_engine(db: Option<PathBuf>) -> Result<AnalyticsEngine> {
    let catalog = resolve_award_catalog()?;
    let path = resolve_db_path(db)?;
    let store = LeagueStore::open(&path)?;
    Ok(AnalyticsEngine::new(store, catalog, CacheSettings::default()))
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fixed-width team name column
pub(crate) fn name_cell(name: &str, width: usize) -> String {
    let mut cell: String = name.chars().take(width).collect();
    let len = cell.chars().count();
    cell.extend(std::iter::repeat(' ').take(width - len));
    cell
}

pub(crate) fn opt_pct(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}
