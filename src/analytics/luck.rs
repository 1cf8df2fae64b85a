//! All-play records and the luck index.
//!
//! A team's all-play record for a week is what it would have gone against
//! every other team that week, decided by category wins on z-scores. Its
//! all-play win percentage is the expected win rate; luck is what the
//! schedule actually produced minus that expectation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::matchup::{self, MatchOutcome};
use super::normalize::{DataQualityIssue, WeekZScores};
use crate::{cli::types::TeamId, storage::models::ScheduledMatchup};

#[cfg(test)]
mod tests;

/// Fewest opponents that still give a meaningful all-play record.
const MIN_ALL_PLAY_OPPONENTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllPlayRecord {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_pct: f64,
}

impl AllPlayRecord {
    fn from_counts(wins: u32, losses: u32, ties: u32) -> Self {
        let games = wins + losses + ties;
        let win_pct = if games == 0 {
            0.0
        } else {
            (wins as f64 + 0.5 * ties as f64) / games as f64
        };
        Self {
            wins,
            losses,
            ties,
            win_pct,
        }
    }
}

/// One team's luck inputs for one week
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamWeekLuck {
    pub team_id: TeamId,
    /// `None` when fewer than two other teams played that week.
    pub all_play: Option<AllPlayRecord>,
    /// `None` when the team had no scheduled matchup (or the opponent has no row).
    pub actual: Option<MatchOutcome>,
}

impl TeamWeekLuck {
    /// Actual score minus all-play expectation, when both are known.
    pub fn luck_index(&self) -> Option<f64> {
        match (self.actual, self.all_play) {
            (Some(actual), Some(all_play)) => Some(actual.score() - all_play.win_pct),
            _ => None,
        }
    }
}

/// Season-level luck for one team
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LuckSummary {
    /// Weeks with both a scheduled result and an all-play record.
    pub weeks: u32,
    pub actual_wins: f64,
    pub expected_wins: f64,
    pub actual_win_pct: f64,
    pub expected_win_pct: f64,
    pub luck: f64,
    pub luck_wins: f64,
}

/// Compute all-play and actual results for every real team in one week.
///
/// `matchups` may contain other weeks; only this week's pairings are used.
pub fn evaluate_week(week: &WeekZScores, matchups: &[ScheduledMatchup]) -> Vec<TeamWeekLuck> {
    let teams: Vec<_> = week.teams().collect();
    let others = teams.len().saturating_sub(1);

    teams
        .iter()
        .map(|team| {
            let all_play = (others >= MIN_ALL_PLAY_OPPONENTS).then(|| {
                let (mut wins, mut losses, mut ties) = (0, 0, 0);
                for other in teams.iter().filter(|o| o.team_id != team.team_id) {
                    match matchup::compare(&team.zscores, &other.zscores).outcome() {
                        MatchOutcome::Win => wins += 1,
                        MatchOutcome::Loss => losses += 1,
                        MatchOutcome::Tie => ties += 1,
                    }
                }
                AllPlayRecord::from_counts(wins, losses, ties)
            });

            let actual = matchups
                .iter()
                .filter(|m| m.season == week.season && m.week == week.week)
                .find_map(|m| m.opponent_of(team.team_id))
                .and_then(|opp| week.row(opp))
                .map(|opp| matchup::compare(&team.zscores, &opp.zscores).outcome());

            TeamWeekLuck {
                team_id: team.team_id,
                all_play,
                actual,
            }
        })
        .collect()
}

/// Record a `MissingTeamRow` issue on `week` for every team scheduled that
/// week without a stat row. Weeks with no rows at all are left alone.
pub fn flag_missing_rows(week: &mut WeekZScores, matchups: &[ScheduledMatchup]) {
    if week.team_count() == 0 {
        return;
    }
    let scheduled: BTreeSet<TeamId> = matchups
        .iter()
        .filter(|m| m.season == week.season && m.week == week.week)
        .flat_map(|m| [m.home_team_id, m.away_team_id])
        .collect();

    for team_id in scheduled {
        if week.row(team_id).is_some() {
            continue;
        }
        warn!(
            season = %week.season,
            week = %week.week,
            team_id = %team_id,
            "scheduled team has no stat row; matchup skipped"
        );
        week.data_quality.push(DataQualityIssue::MissingTeamRow {
            week: week.week,
            team_id,
        });
    }
}

/// Fold one team's weekly luck into a season summary.
pub fn summarize<'a>(weeks: impl IntoIterator<Item = &'a TeamWeekLuck>) -> LuckSummary {
    let mut summary = LuckSummary::default();
    for week in weeks {
        if let (Some(actual), Some(all_play)) = (week.actual, week.all_play) {
            summary.weeks += 1;
            summary.actual_wins += actual.score();
            summary.expected_wins += all_play.win_pct;
        }
    }

    if summary.weeks > 0 {
        let n = summary.weeks as f64;
        summary.actual_win_pct = summary.actual_wins / n;
        summary.expected_win_pct = summary.expected_wins / n;
        summary.luck = summary.actual_win_pct - summary.expected_win_pct;
        summary.luck_wins = summary.actual_wins - summary.expected_wins;
    }
    summary
}
