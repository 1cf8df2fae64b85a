use super::*;
use crate::analytics::normalize::normalize_week;
use crate::cli::types::{Category, CategoryMap, Season, Week};
use crate::storage::models::WeeklyTeamStat;
use std::collections::HashMap;

fn stat(team: u32, level: f64) -> WeeklyTeamStat {
    WeeklyTeamStat {
        season: Season::new(2024),
        week: Week::new(1),
        team_id: TeamId::new(team),
        values: CategoryMap::from_fn(|_| Some(level)),
        completed: true,
    }
}

fn week_of(rows: &[WeeklyTeamStat]) -> WeekZScores {
    let refs: Vec<&WeeklyTeamStat> = rows.iter().collect();
    normalize_week(Season::new(2024), Week::new(1), &refs, &HashMap::new())
}

fn matchup(home: u32, away: u32) -> ScheduledMatchup {
    ScheduledMatchup {
        season: Season::new(2024),
        week: Week::new(1),
        home_team_id: TeamId::new(home),
        away_team_id: TeamId::new(away),
    }
}

fn by_team(results: &[TeamWeekLuck], team: u32) -> TeamWeekLuck {
    *results
        .iter()
        .find(|r| r.team_id == TeamId::new(team))
        .unwrap()
}

#[test]
fn test_all_play_strictly_ordered_teams() {
    let week = week_of(&[stat(1, 40.0), stat(2, 30.0), stat(3, 20.0), stat(4, 10.0)]);
    let results = evaluate_week(&week, &[matchup(1, 4), matchup(2, 3)]);

    let top = by_team(&results, 1).all_play.unwrap();
    assert_eq!((top.wins, top.losses, top.ties), (3, 0, 0));
    assert_eq!(top.win_pct, 1.0);

    let third = by_team(&results, 3).all_play.unwrap();
    assert_eq!((third.wins, third.losses, third.ties), (1, 2, 0));
    assert!((third.win_pct - 1.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_all_play_ties_count_half() {
    let week = week_of(&[stat(1, 10.0), stat(2, 10.0), stat(3, 5.0)]);
    let results = evaluate_week(&week, &[]);

    let record = by_team(&results, 1).all_play.unwrap();
    assert_eq!((record.wins, record.losses, record.ties), (1, 0, 1));
    assert!((record.win_pct - 0.75).abs() < 1e-12);
}

#[test]
fn test_all_play_excluded_with_fewer_than_two_opponents() {
    let week = week_of(&[stat(1, 10.0), stat(2, 5.0)]);
    let results = evaluate_week(&week, &[matchup(1, 2)]);

    let luck = by_team(&results, 1);
    assert!(luck.all_play.is_none());
    assert_eq!(luck.actual, Some(MatchOutcome::Win));
    assert!(luck.luck_index().is_none());
}

#[test]
fn test_actual_result_from_scheduled_matchup() {
    let week = week_of(&[stat(1, 40.0), stat(2, 30.0), stat(3, 20.0), stat(4, 10.0)]);
    let results = evaluate_week(&week, &[matchup(2, 1), matchup(4, 3)]);

    assert_eq!(by_team(&results, 1).actual, Some(MatchOutcome::Win));
    assert_eq!(by_team(&results, 2).actual, Some(MatchOutcome::Loss));
    // Team 2 is second-best but drew the top team
    let index = by_team(&results, 2).luck_index().unwrap();
    assert!((index + 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_matchup_from_other_week_is_ignored() {
    let week = week_of(&[stat(1, 40.0), stat(2, 30.0), stat(3, 20.0)]);
    let mut other = matchup(1, 2);
    other.week = Week::new(2);

    let results = evaluate_week(&week, &[other]);
    assert!(results.iter().all(|r| r.actual.is_none()));
}

#[test]
fn test_category_split_decides_actual() {
    let mut a = stat(1, 10.0);
    let mut b = stat(2, 10.0);
    for cat in Category::ALL {
        if cat.index() < 5 {
            a.values[cat] = Some(12.0);
        } else {
            b.values[cat] = Some(12.0);
        }
    }
    let week = week_of(&[a, b, stat(3, 10.0)]);
    let results = evaluate_week(&week, &[matchup(1, 2)]);
    assert_eq!(by_team(&results, 1).actual, Some(MatchOutcome::Win));
    assert_eq!(by_team(&results, 2).actual, Some(MatchOutcome::Loss));
}

#[test]
fn test_summarize_matching_results_has_zero_luck() {
    let weeks = [
        TeamWeekLuck {
            team_id: TeamId::new(1),
            all_play: Some(AllPlayRecord::from_counts(3, 0, 0)),
            actual: Some(MatchOutcome::Win),
        },
        TeamWeekLuck {
            team_id: TeamId::new(1),
            all_play: Some(AllPlayRecord::from_counts(0, 3, 0)),
            actual: Some(MatchOutcome::Loss),
        },
    ];
    let summary = summarize(&weeks);

    assert_eq!(summary.weeks, 2);
    assert_eq!(summary.actual_win_pct, 0.5);
    assert_eq!(summary.expected_win_pct, 0.5);
    assert_eq!(summary.luck, 0.0);
    assert_eq!(summary.luck_wins, 0.0);
}

#[test]
fn test_summarize_skips_incomplete_weeks() {
    let weeks = [
        TeamWeekLuck {
            team_id: TeamId::new(1),
            all_play: Some(AllPlayRecord::from_counts(1, 2, 0)),
            actual: Some(MatchOutcome::Win),
        },
        TeamWeekLuck {
            team_id: TeamId::new(1),
            all_play: None,
            actual: Some(MatchOutcome::Win),
        },
        TeamWeekLuck {
            team_id: TeamId::new(1),
            all_play: Some(AllPlayRecord::from_counts(3, 0, 0)),
            actual: None,
        },
    ];
    let summary = summarize(&weeks);

    assert_eq!(summary.weeks, 1);
    assert_eq!(summary.actual_wins, 1.0);
    assert!((summary.expected_wins - 1.0 / 3.0).abs() < 1e-12);
    assert!((summary.luck - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn test_summarize_empty_is_zero() {
    let none: Vec<TeamWeekLuck> = Vec::new();
    assert_eq!(summarize(&none), LuckSummary::default());
}

#[test]
fn test_scheduled_team_without_row_is_flagged() {
    let mut week = week_of(&[stat(1, 40.0), stat(2, 30.0), stat(3, 20.0)]);
    let matchups = [matchup(1, 2), matchup(3, 4)];
    flag_missing_rows(&mut week, &matchups);

    assert_eq!(
        week.data_quality,
        vec![DataQualityIssue::MissingTeamRow {
            week: Week::new(1),
            team_id: TeamId::new(4),
        }]
    );
    let results = evaluate_week(&week, &matchups);
    assert_eq!(by_team(&results, 3).actual, None);
    assert_eq!(by_team(&results, 1).actual, Some(MatchOutcome::Win));
}

#[test]
fn test_empty_week_is_not_flagged() {
    let mut week = week_of(&[]);
    flag_missing_rows(&mut week, &[matchup(1, 2)]);
    assert!(week.data_quality.is_empty());
}
