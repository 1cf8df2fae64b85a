use super::*;
use crate::analytics::fixtures::{four_team_season, matchup, stat};

fn frame(season: u16) -> SeasonFrame {
    SeasonFrame::build(&four_team_season(season))
}

fn record<'a>(records: &'a [OpponentSeasonRecord], team: u32, opp: u32) -> &'a OpponentSeasonRecord {
    records
        .iter()
        .find(|r| r.team_id == TeamId::new(team) && r.opponent_team_id == TeamId::new(opp))
        .unwrap()
}

#[test]
fn test_season_records_only_scheduled_completed_weeks() {
    let records = season_records(&frame(2024));

    // Week 4 (1 v 2) is in progress and must not count
    let alpha_bravo = record(&records, 1, 2);
    assert_eq!(alpha_bravo.matchups, 1);
    assert_eq!(alpha_bravo.wins, 1);
    assert_eq!(alpha_bravo.opponent_name, "Bravo");

    let alpha_charlie = record(&records, 1, 3);
    assert_eq!((alpha_charlie.matchups, alpha_charlie.wins), (2, 2));

    // 1 never played 4
    assert!(records
        .iter()
        .all(|r| !(r.team_id == TeamId::new(1) && r.opponent_team_id == TeamId::new(4))));
}

#[test]
fn test_season_records_are_mirrored() {
    let records = season_records(&frame(2024));
    for r in &records {
        let mirror = record(&records, r.opponent_team_id.as_u32(), r.team_id.as_u32());
        assert_eq!(r.matchups, mirror.matchups);
        assert_eq!(r.wins, mirror.losses);
        assert_eq!(r.ties, mirror.ties);
        for cat in Category::ALL {
            assert_eq!(r.categories[cat].wins, mirror.categories[cat].losses);
            assert!((r.categories[cat].diff_sum + mirror.categories[cat].diff_sum).abs() < 1e-12);
        }
    }
}

#[test]
fn test_wins_losses_ties_sum_to_matchups() {
    let records = season_records(&frame(2024));
    for r in &records {
        assert_eq!(r.wins + r.losses + r.ties, r.matchups);
        for cat in Category::ALL {
            let c = r.categories[cat];
            assert_eq!(c.wins + c.losses + c.ties, r.matchups);
        }
    }
}

#[test]
fn test_matchup_without_both_rows_is_skipped() {
    let mut data = four_team_season(2024);
    // Team 4 has no week-3 row
    data.matchups.push(matchup(2024, 3, 2, 4));
    let records = season_records(&SeasonFrame::build(&data));

    let bravo_delta = record(&records, 2, 4);
    assert_eq!(bravo_delta.matchups, 1);
}

#[test]
fn test_merge_across_seasons() {
    let mut all = season_records(&frame(2023));
    all.extend(season_records(&frame(2024)));

    let rows = merge(TeamId::new(3), &all, |_| None);
    let names: Vec<&str> = rows.iter().map(|r| r.opponent_name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Delta"]);

    let alpha = &rows[0];
    assert_eq!(alpha.overall.matchups, 4);
    assert_eq!(alpha.overall.losses, 4);
    assert_eq!(alpha.overall.win_pct, 0.0);
    assert_eq!(
        alpha.overall.wins + alpha.overall.losses + alpha.overall.ties,
        alpha.overall.matchups
    );
    assert!(alpha.categories[Category::Pts].avg_diff < 0.0);

    let delta = &rows[1];
    assert_eq!(delta.overall.matchups, 2);
    assert_eq!(delta.overall.win_pct, 1.0);
    assert_eq!(delta.categories[Category::Blk].win_pct, 1.0);
}

#[test]
fn test_merge_avg_diff_is_mean_of_diffs() {
    let records = season_records(&frame(2024));
    let rows = merge(TeamId::new(1), &records, |_| None);
    let charlie = rows.iter().find(|r| r.opponent_team_id == TeamId::new(3)).unwrap();

    let expected = record(&records, 1, 3).categories[Category::Ast].diff_sum / 2.0;
    assert!((charlie.categories[Category::Ast].avg_diff - expected).abs() < 1e-12);
}

#[test]
fn test_merge_uses_current_name_then_latest_season_name() {
    let mut old = season_records(&frame(2023));
    for r in old.iter_mut() {
        r.opponent_name = format!("Old {}", r.opponent_name);
    }
    old.extend(season_records(&frame(2024)));

    let fallback = merge(TeamId::new(1), &old, |_| None);
    assert_eq!(fallback[0].opponent_name, "Bravo");

    let renamed = merge(TeamId::new(1), &old, |id| {
        (id == TeamId::new(3)).then(|| "Aardvarks".to_string())
    });
    let names: Vec<&str> = renamed.iter().map(|r| r.opponent_name.as_str()).collect();
    assert_eq!(names, vec!["Aardvarks", "Bravo"]);
}

#[test]
fn test_merge_unknown_team_is_empty() {
    let records = season_records(&frame(2024));
    assert!(merge(TeamId::new(99), &records, |_| None).is_empty());
}

#[test]
fn test_tied_matchup() {
    let data = crate::storage::models::SeasonData {
        season: Season::new(2024),
        teams: Vec::new(),
        stats: vec![
            stat(2024, 1, 1, 10.0, true),
            stat(2024, 1, 2, 10.0, true),
            stat(2024, 1, 3, 1.0, true),
        ],
        matchups: vec![matchup(2024, 1, 1, 2)],
    };
    let records = season_records(&SeasonFrame::build(&data));
    let r = record(&records, 1, 2);
    assert_eq!((r.wins, r.losses, r.ties), (0, 0, 1));
    assert_eq!(r.categories[Category::Pts].ties, 1);
}

#[test]
fn test_validate_range() {
    assert!(validate_range(Season::new(2020), Season::new(2024)).is_ok());
    assert!(validate_range(Season::new(2024), Season::new(2024)).is_ok());
    match validate_range(Season::new(2025), Season::new(2024)) {
        Err(AnalyticsError::InvalidYearRange { min, max }) => assert_eq!((min, max), (2025, 2024)),
        other => panic!("Expected InvalidYearRange, got {:?}", other),
    }
}

#[test]
fn test_pairing_listed_from_both_sides_counts_once() {
    let mut data = four_team_season(2024);
    data.matchups.push(matchup(2024, 1, 2, 1));
    data.matchups.push(matchup(2024, 1, 4, 3));
    let records = season_records(&SeasonFrame::build(&data));

    let alpha_bravo = record(&records, 1, 2);
    assert_eq!((alpha_bravo.matchups, alpha_bravo.wins), (1, 1));
    let delta_charlie = record(&records, 4, 3);
    assert_eq!((delta_charlie.matchups, delta_charlie.losses), (1, 1));
    for r in &records {
        assert_eq!(r.wins + r.losses + r.ties, r.matchups);
    }
}
