//! Weekly views: power ranking and raw z-scores

use std::fmt::Write;

use super::{name_cell, opt_pct, print_json};
use crate::{
    analytics::{
        normalize::{DataQualityIssue, WeekZScores},
        power::WeekPower,
    },
    cli::types::Category,
    engine::AnalyticsEngine,
    Result, Season, Week,
};

/// Handle the week-power command
pub fn handle_week_power(engine: &AnalyticsEngine, season: Season, week: Week, as_json: bool) -> Result<()> {
    let power = engine.week_power(season, week)?;
    if as_json {
        return print_json(&power);
    }
    print!("{}", render_week_power(&power));
    Ok(())
}

/// Handle the week-zscores command
pub fn handle_week_zscores(engine: &AnalyticsEngine, season: Season, week: Week, as_json: bool) -> Result<()> {
    let zscores = engine.week_zscores(season, week)?;
    if as_json {
        return print_json(&zscores);
    }
    print!("{}", render_week_zscores(&zscores));
    Ok(())
}

/// Handle the season-zscores command
pub fn handle_season_zscores(engine: &AnalyticsEngine, season: Season, as_json: bool) -> Result<()> {
    let weeks = engine.season_zscores(season)?;
    if as_json {
        return print_json(&weeks);
    }
    if weeks.is_empty() {
        println!("No stats for Season {}", season);
    }
    for week in &weeks {
        println!("{}", render_week_zscores(week));
    }
    Ok(())
}

fn status(complete: bool) -> &'static str {
    if complete {
        "final"
    } else {
        "in progress"
    }
}

fn render_issues(out: &mut String, issues: &[DataQualityIssue]) {
    for issue in issues {
        match issue {
            DataQualityIssue::MissingCategory { team_id, category } => {
                let _ = writeln!(out, "! team {} missing {} (counted as 0)", team_id, category);
            }
            DataQualityIssue::MissingTeamRow { week, team_id } => {
                let _ = writeln!(out, "! team {} scheduled in week {} has no stats (matchup skipped)", team_id, week);
            }
        }
    }
}

pub fn render_week_power(power: &WeekPower) -> String {
    let mut out = String::new();
    if power.rows.is_empty() {
        let _ = writeln!(out, "No stats for Season {} Week {}", power.season, power.week);
        return out;
    }

    let _ = writeln!(
        out,
        "Season {} Week {} ({})",
        power.season,
        power.week,
        status(power.complete)
    );
    let _ = writeln!(out, "{:>4}  {}  {:>8}  {:>8}  {:>7}", "Rank", name_cell("Team", 24), "Total Z", "All-play", "Luck");
    for row in &power.rows {
        let rank = if row.is_league_average {
            "-".to_string()
        } else {
            row.rank.to_string()
        };
        let _ = writeln!(
            out,
            "{:>4}  {}  {:>8.2}  {:>8}  {:>7}",
            rank,
            name_cell(&row.team_name, 24),
            row.total_z,
            opt_pct(row.all_play.map(|a| a.win_pct)),
            row.luck_index.map_or_else(|| "-".to_string(), |l| format!("{:+.3}", l)),
        );
    }
    render_issues(&mut out, &power.data_quality);
    out
}

pub fn render_week_zscores(week: &WeekZScores) -> String {
    let mut out = String::new();
    if week.rows.is_empty() {
        let _ = writeln!(out, "No stats for Season {} Week {}", week.season, week.week);
        return out;
    }

    let _ = writeln!(out, "Season {} Week {} ({})", week.season, week.week, status(week.complete));
    let mut header = name_cell("Team", 24);
    for cat in Category::ALL {
        let _ = write!(header, " {:>6}", cat.label());
    }
    let _ = writeln!(out, "{} {:>7}", header, "Total");
    for row in &week.rows {
        let mut line = name_cell(&row.team_name, 24);
        for cat in Category::ALL {
            let _ = write!(line, " {:>6.2}", row.zscores[cat]);
        }
        let _ = writeln!(out, "{} {:>7.2}", line, row.total_z);
    }
    render_issues(&mut out, &week.data_quality);
    out
}
