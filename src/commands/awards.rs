//! Awards command implementation

use std::fmt::Write;

use super::print_json;
use crate::{
    analytics::awards::{Award, AwardWinner, AwardsReport, AwardsRequest, YearSelector},
    cli::types::{AwardMode, AwardScopeKind, OwnerCode},
    engine::AnalyticsEngine,
    Result, Season, TeamId,
};

/// Parameters for the awards command
#[derive(Debug, Clone)]
pub struct AwardsParams {
    pub scope: AwardScopeKind,
    pub mode: AwardMode,
    pub season: Option<Season>,
    pub team_id: Option<TeamId>,
    pub owner: Option<OwnerCode>,
    pub owner_era_only: bool,
    pub as_json: bool,
}

impl From<&AwardsParams> for AwardsRequest {
    fn from(params: &AwardsParams) -> Self {
        AwardsRequest {
            scope: params.scope,
            mode: params.mode,
            years: params
                .season
                .map_or(YearSelector::AllTime, YearSelector::Season),
            team_id: params.team_id,
            owner: params.owner.clone(),
            owner_era_only: params.owner_era_only,
        }
    }
}

/// Handle the awards command
pub fn handle_awards(engine: &AnalyticsEngine, params: AwardsParams) -> Result<()> {
    let report = engine.awards(&AwardsRequest::from(&params))?;
    if params.as_json {
        return print_json(&report);
    }
    print!("{}", render_awards(&report));
    Ok(())
}

fn render_winner(out: &mut String, winner: &AwardWinner) {
    let when = match winner.week {
        Some(week) => format!("{} wk {}", winner.season, week),
        None => winner.season.to_string(),
    };
    let owner = winner
        .owner_code
        .as_ref()
        .map(|o| format!(" ({})", o))
        .unwrap_or_default();
    let _ = write!(out, "    {} {}{} {:.2}", when, winner.team_name, owner, winner.value);
    if let Some(raw) = winner.raw_value {
        let _ = write!(out, " [raw {:.2}]", raw);
    }
    if let (Some(actual), Some(expected)) = (winner.actual_win_pct, winner.expected_win_pct) {
        let _ = write!(out, " [actual {:.3}, all-play {:.3}]", actual, expected);
    }
    out.push('\n');
}

fn render_award_list(out: &mut String, awards: &[Award]) {
    for award in awards {
        let _ = writeln!(out, "  {}", award.label);
        if award.winners.is_empty() {
            let _ = writeln!(out, "    -");
        }
        for winner in &award.winners {
            render_winner(out, winner);
        }
    }
}

pub fn render_awards(report: &AwardsReport) -> String {
    let mut out = String::new();
    match report {
        AwardsReport::Summary { awards } => {
            let _ = writeln!(out, "Awards");
            render_award_list(&mut out, awards);
        }
        AwardsReport::YearByYear { seasons } => {
            if seasons.is_empty() {
                let _ = writeln!(out, "No eligible seasons");
            }
            for season in seasons {
                let _ = writeln!(out, "Season {}", season.season);
                render_award_list(&mut out, &season.awards);
            }
        }
    }
    out
}
