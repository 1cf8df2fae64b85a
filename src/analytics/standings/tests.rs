use super::*;
use crate::analytics::fixtures::{four_team_season, matchup, stat, team};
use crate::storage::models::SeasonData;

fn row(standings: &Standings, team: u32) -> &StandingsRow {
    standings
        .rows
        .iter()
        .find(|r| r.team_id == TeamId::new(team))
        .unwrap()
}

#[test]
fn test_standings_over_completed_weeks() {
    let standings = season_standings(&SeasonFrame::build(&four_team_season(2024)));

    // Week 4 is in progress and does not count
    assert_eq!(
        standings.completed_weeks,
        vec![Week::new(1), Week::new(2), Week::new(3)]
    );
    let alpha = row(&standings, 1);
    assert_eq!((alpha.matchup.wins, alpha.matchup.losses), (3, 0));
    assert_eq!(alpha.categories.wins, 27);

    let charlie = row(&standings, 3);
    assert_eq!((charlie.matchup.wins, charlie.matchup.losses), (1, 2));
    assert_eq!((charlie.categories.wins, charlie.categories.losses), (9, 18));
}

#[test]
fn test_order_breaks_equal_wins_on_losses() {
    let standings = season_standings(&SeasonFrame::build(&four_team_season(2024)));
    let order: Vec<u32> = standings.rows.iter().map(|r| r.team_id.as_u32()).collect();
    let ranks: Vec<u32> = standings.rows.iter().map(|r| r.rank).collect();

    // Bravo and Charlie both won once with 9 categories; Bravo lost fewer
    assert_eq!(order, vec![1, 2, 3, 4]);
    assert_eq!(ranks, vec![1, 2, 3, 4]);
}

#[test]
fn test_category_and_matchup_totals_balance() {
    let standings = season_standings(&SeasonFrame::build(&four_team_season(2024)));
    let wins: u32 = standings.rows.iter().map(|r| r.matchup.wins).sum();
    let losses: u32 = standings.rows.iter().map(|r| r.matchup.losses).sum();
    assert_eq!(wins, losses);
    for r in &standings.rows {
        assert_eq!(r.categories.games(), 9 * r.matchup.games());
    }
}

#[test]
fn test_identical_teams_tie_and_share_rank() {
    let data = SeasonData {
        season: Season::new(2024),
        teams: vec![team(2024, 1, "Alpha", None), team(2024, 2, "Bravo", None)],
        stats: vec![stat(2024, 1, 2, 30.0, true), stat(2024, 1, 1, 30.0, true)],
        matchups: vec![matchup(2024, 1, 1, 2), matchup(2024, 1, 2, 1)],
    };
    let standings = season_standings(&SeasonFrame::build(&data));

    assert_eq!(standings.rows.len(), 2);
    for r in &standings.rows {
        assert_eq!(r.rank, 1);
        assert_eq!(r.matchup, WinLossTie { wins: 0, losses: 0, ties: 1 });
        assert_eq!(r.categories.ties, 9);
    }
    assert_eq!(standings.rows[0].team_id, TeamId::new(1));
}

#[test]
fn test_no_completed_weeks_is_empty() {
    let mut data = four_team_season(2024);
    data.stats.iter_mut().for_each(|s| s.completed = false);
    let standings = season_standings(&SeasonFrame::build(&data));
    assert!(standings.rows.is_empty());
    assert!(standings.completed_weeks.is_empty());
}
