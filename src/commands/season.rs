//! Season views: standings, power ranking and team history

use std::fmt::Write;

use super::{name_cell, print_json};
use crate::{
    analytics::{history::TeamHistory, power::SeasonPowerRow, standings::Standings},
    engine::AnalyticsEngine,
    Result, Season, TeamId,
};

/// Handle the season-power command
pub fn handle_season_power(engine: &AnalyticsEngine, season: Season, as_json: bool) -> Result<()> {
    let rows = engine.season_power(season)?;
    if as_json {
        return print_json(&rows);
    }
    print!("{}", render_season_power(season, &rows));
    Ok(())
}

pub fn handle_standings(engine: &AnalyticsEngine, season: Season, as_json: bool) -> Result<()> {
    let standings = engine.standings(season)?;
    if as_json {
        return print_json(&standings);
    }
    print!("{}", render_standings(&standings));
    Ok(())
}

/// Handle the team-history command
pub fn handle_team_history(
    engine: &AnalyticsEngine,
    season: Season,
    team_id: TeamId,
    as_json: bool,
) -> Result<()> {
    let history = engine.team_history(season, team_id)?;
    if as_json {
        return print_json(&history);
    }
    print!("{}", render_team_history(&history));
    Ok(())
}

pub fn render_season_power(season: Season, rows: &[SeasonPowerRow]) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        let _ = writeln!(out, "No completed weeks for Season {}", season);
        return out;
    }

    let _ = writeln!(out, "Season {}", season);
    let _ = writeln!(
        out,
        "{:>4}  {}  {:>5}  {:>7}  {:>8}  {:>7}  {:>7}  {:>7}",
        "Rank",
        name_cell("Team", 24),
        "Weeks",
        "Avg Z",
        "Sum Z",
        "Actual",
        "AllPlay",
        "Luck"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>4}  {}  {:>5}  {:>7.2}  {:>8.2}  {:>7.3}  {:>7.3}  {:>+7.3}",
            row.rank,
            name_cell(&row.team_name, 24),
            row.weeks_played,
            row.avg_total_z,
            row.sum_total_z,
            row.luck.actual_win_pct,
            row.luck.expected_win_pct,
            row.luck.luck,
        );
    }
    out
}

pub fn render_standings(standings: &Standings) -> String {
    let mut out = String::new();
    if standings.rows.is_empty() {
        let _ = writeln!(out, "No completed weeks for Season {}", standings.season);
        return out;
    }

    let through = standings.completed_weeks.last().map_or(0, |w| w.as_u16());
    let _ = writeln!(out, "Season {} standings through week {}", standings.season, through);
    let _ = writeln!(out, "{:>4}  {}  {:>8}  {:>10}", "Rank", name_cell("Team", 24), "Record", "Categories");
    for row in &standings.rows {
        let m = row.matchup;
        let record = if m.ties > 0 {
            format!("{}-{}-{}", m.wins, m.losses, m.ties)
        } else {
            format!("{}-{}", m.wins, m.losses)
        };
        let c = row.categories;
        let _ = writeln!(
            out,
            "{:>4}  {}  {:>8}  {:>10}",
            row.rank,
            name_cell(&row.team_name, 24),
            record,
            format!("{}-{}-{}", c.wins, c.losses, c.ties),
        );
    }
    out
}

pub fn render_team_history(history: &TeamHistory) -> String {
    let mut out = String::new();
    let name = history
        .team_name
        .clone()
        .unwrap_or_else(|| format!("Team {}", history.team_id));
    if history.entries.is_empty() {
        let _ = writeln!(out, "No completed weeks for {} in Season {}", name, history.season);
        return out;
    }

    let _ = writeln!(out, "{} - Season {}", name, history.season);
    let _ = writeln!(
        out,
        "{:>4}  {:>4}  {:>7}  {:>9}  {:>7}",
        "Week", "Rank", "Total Z", "Running Z", "Avg Z"
    );
    for entry in &history.entries {
        let _ = writeln!(
            out,
            "{:>4}  {:>4}  {:>7.2}  {:>9.2}  {:>7.2}",
            entry.week.as_u16(), entry.rank, entry.total_z, entry.cumulative_total_z, entry.league_average_total_z
        );
    }
    out
}
