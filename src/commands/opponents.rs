//! Opponent matrix command implementation

use std::fmt::Write;

use super::{name_cell, print_json};
use crate::{
    analytics::opponents::OpponentMatrix, cli::SeasonRange, engine::AnalyticsEngine, Result,
    Season, TeamId,
};

/// Fill an open-ended range from the seasons that have data.
///
/// With no seasons to fill from, a lone bound stands for both ends. `None`
/// when neither bound is given and the league has no seasons yet.
pub fn resolve_range(range: &SeasonRange, known: &[Season]) -> Option<(Season, Season)> {
    let min = range.min.or(known.first().copied());
    let max = range.max.or(known.last().copied());
    match (min, max) {
        (Some(min), Some(max)) => Some((min, max)),
        (Some(only), None) | (None, Some(only)) => Some((only, only)),
        (None, None) => None,
    }
}

/// Handle the opponent-matrix command
pub fn handle_opponent_matrix(
    engine: &AnalyticsEngine,
    team_id: TeamId,
    range: &SeasonRange,
    owner_era_only: bool,
    as_json: bool,
) -> Result<()> {
    let Some((min, max)) = resolve_range(range, &engine.seasons()?) else {
        if as_json {
            return print_json(&serde_json::json!({
                "team_id": team_id,
                "min_season": null,
                "max_season": null,
                "owner_era_only": owner_era_only,
                "rows": [],
            }));
        }
        println!("No seasons with data yet");
        return Ok(());
    };
    let matrix = engine.opponent_matrix(team_id, min, max, owner_era_only)?;
    if as_json {
        return print_json(&matrix);
    }
    print!("{}", render_opponent_matrix(&matrix));
    Ok(())
}

pub fn render_opponent_matrix(matrix: &OpponentMatrix) -> String {
    let mut out = String::new();
    let era = if matrix.owner_era_only {
        ", current owner era"
    } else {
        ""
    };
    let _ = writeln!(
        out,
        "Team {} vs opponents, {}-{}{}",
        matrix.team_id, matrix.min_season, matrix.max_season, era
    );
    if matrix.rows.is_empty() {
        let _ = writeln!(out, "No completed matchups in range");
        return out;
    }

    let _ = writeln!(
        out,
        "{}  {:>3}  {:>3}  {:>3}  {:>3}  {:>6}",
        name_cell("Opponent", 24),
        "GP",
        "W",
        "L",
        "T",
        "Pct"
    );
    for row in &matrix.rows {
        let o = &row.overall;
        let _ = writeln!(
            out,
            "{}  {:>3}  {:>3}  {:>3}  {:>3}  {:>6.3}",
            name_cell(&row.opponent_name, 24),
            o.matchups,
            o.wins,
            o.losses,
            o.ties,
            o.win_pct
        );
    }
    out
}
