//! Maintenance commands: aggregate rebuilds and bulk import

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;

use super::print_json;
use crate::{
    cli::{types::RebuildKind, SeasonRange},
    engine::{AnalyticsEngine, RebuildReport, RebuildStatus, SeasonSelector},
    storage::LeagueImport,
    Result, Season,
};

/// A single season wins; otherwise a (possibly open) range; otherwise everything
pub fn season_selector(season: Option<Season>, range: &SeasonRange) -> SeasonSelector {
    match (season, range.min, range.max) {
        (Some(season), _, _) => SeasonSelector::Season(season),
        (None, None, None) => SeasonSelector::All,
        (None, min, max) => SeasonSelector::Range {
            min: min.unwrap_or(Season::new(0)),
            max: max.unwrap_or(Season::new(u16::MAX)),
        },
    }
}

/// Handle the rebuild command
pub fn handle_rebuild(
    engine: &AnalyticsEngine,
    kind: RebuildKind,
    selector: SeasonSelector,
    force: bool,
    as_json: bool,
) -> Result<()> {
    let report = engine.rebuild(kind, selector, force)?;
    if as_json {
        return print_json(&report);
    }
    print!("{}", render_rebuild(&report));
    Ok(())
}

pub fn render_rebuild(report: &RebuildReport) -> String {
    let mut out = String::new();
    if report.outcomes.is_empty() {
        let _ = writeln!(out, "Nothing to rebuild");
        return out;
    }
    for outcome in &report.outcomes {
        let status = match outcome.status {
            RebuildStatus::Rebuilt { rows } => format!("rebuilt ({} rows)", rows),
            RebuildStatus::Skipped => "up to date".to_string(),
            RebuildStatus::NoSourceData => "no source data".to_string(),
        };
        let _ = writeln!(out, "{} {}: {}", outcome.season, outcome.family, status);
    }
    let _ = writeln!(out, "✓ {} aggregate(s) rebuilt", report.rebuilt());
    out
}

/// Seasons mentioned anywhere in an import document
pub fn imported_seasons(doc: &LeagueImport) -> BTreeSet<Season> {
    doc.teams
        .iter()
        .map(|t| t.season)
        .chain(doc.stats.iter().map(|s| s.season))
        .chain(doc.matchups.iter().map(|m| m.season))
        .collect()
}

/// Handle the import command
pub fn handle_import(engine: &AnalyticsEngine, file: &Path, rebuild: bool, as_json: bool) -> Result<()> {
    let doc: LeagueImport = serde_json::from_str(&std::fs::read_to_string(file)?)?;
    let summary = engine.import(&doc)?;

    let mut report = RebuildReport::default();
    if rebuild {
        for season in imported_seasons(&doc) {
            match engine.rebuild(RebuildKind::All, SeasonSelector::Season(season), true) {
                Ok(r) => report.outcomes.extend(r.outcomes),
                // Team metadata without stats is a valid import
                Err(crate::AnalyticsError::NoSourceData { .. }) => {}
                Err(err) => return Err(err),
            }
        }
    }

    if as_json {
        return print_json(&serde_json::json!({
            "teams": summary.teams,
            "stats": summary.stats,
            "matchups": summary.matchups,
            "rebuild": report,
        }));
    }

    println!(
        "✓ Imported {} team seasons, {} weekly stat rows, {} matchups",
        summary.teams, summary.stats, summary.matchups
    );
    if rebuild {
        print!("{}", render_rebuild(&report));
    }
    Ok(())
}
