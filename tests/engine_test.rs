//! Integration tests for the analytics engine over an on-disk database

mod common;

use common::{league_season, merge, stat, team};
use league_analytics::{
    analytics::{
        awards::{AwardsReport, AwardsRequest, YearSelector},
        normalize::DataQualityIssue,
    },
    cli::types::{AwardMode, AwardScopeKind, RebuildKind},
    engine::{RebuildStatus, SeasonSelector},
    storage::{AggregateFamily, LeagueImport, LeagueStore},
    AnalyticsEngine, AnalyticsError, Category, OwnerCode, Season, TeamId, Week,
};
use std::path::Path;
use tempfile::TempDir;

fn open(path: &Path) -> AnalyticsEngine {
    AnalyticsEngine::with_defaults(LeagueStore::open(path).unwrap())
}

fn seeded(dir: &TempDir, doc: &LeagueImport) -> AnalyticsEngine {
    let engine = open(&dir.path().join("league.db"));
    engine.import(doc).unwrap();
    engine
}

#[test]
fn test_lazy_aggregate_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let season = Season::new(2024);
    let rows = {
        let engine = seeded(&dir, &league_season(2024, 3));
        engine.season_power(season).unwrap()
    };
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].team_name, "Alpha");

    // A fresh engine reads the persisted rows without rebuilding
    let store = LeagueStore::open(&dir.path().join("league.db")).unwrap();
    assert!(store
        .has_aggregate(AggregateFamily::SeasonPower, season)
        .unwrap());
    let builds_before = store.aggregate_builds().unwrap();
    let engine = AnalyticsEngine::with_defaults(store);
    assert_eq!(engine.season_power(season).unwrap(), rows);

    let report = engine
        .rebuild(RebuildKind::SeasonPower, SeasonSelector::Season(season), false)
        .unwrap();
    assert_eq!(report.outcomes[0].status, RebuildStatus::Skipped);
    assert_eq!(builds_before.len(), 1);
}

#[test]
fn test_force_rebuild_picks_up_new_weeks() {
    let dir = TempDir::new().unwrap();
    let engine = seeded(&dir, &league_season(2024, 2));
    let season = Season::new(2024);
    assert!(engine
        .season_power(season)
        .unwrap()
        .iter()
        .all(|r| r.weeks_played == 2));

    // Week 3 lands after the aggregate was built
    engine.import(&league_season(2024, 3)).unwrap();
    assert!(engine
        .season_power(season)
        .unwrap()
        .iter()
        .all(|r| r.weeks_played == 2));

    let report = engine
        .rebuild(RebuildKind::All, SeasonSelector::Season(season), true)
        .unwrap();
    assert_eq!(report.rebuilt(), 3);
    assert!(engine
        .season_power(season)
        .unwrap()
        .iter()
        .all(|r| r.weeks_played == 3));
    assert_eq!(
        engine.team_history(season, TeamId::new(2)).unwrap().entries.len(),
        3
    );
}

#[test]
fn test_rebuild_without_data_leaves_previous_aggregate() {
    let dir = TempDir::new().unwrap();
    let engine = seeded(&dir, &league_season(2024, 3));
    engine
        .rebuild(RebuildKind::All, SeasonSelector::All, false)
        .unwrap();

    let err = engine
        .rebuild(
            RebuildKind::All,
            SeasonSelector::Season(Season::new(2031)),
            true,
        )
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::NoSourceData { season: 2031 }));
    assert!(!err.is_validation());

    let store = LeagueStore::open(&dir.path().join("league.db")).unwrap();
    assert_eq!(store.aggregate_builds().unwrap().len(), 3);
    assert!(store
        .load_season_power(Season::new(2031))
        .unwrap()
        .is_none());
}

#[test]
fn test_missing_category_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let mut doc = league_season(2024, 1);
    doc.stats[3].values[Category::Blk] = None;
    let engine = seeded(&dir, &doc);

    let week = engine.week_zscores(Season::new(2024), Week::new(1)).unwrap();
    assert_eq!(
        week.data_quality,
        vec![DataQualityIssue::MissingCategory {
            team_id: TeamId::new(4),
            category: Category::Blk,
        }]
    );
    let delta = week.row(TeamId::new(4)).unwrap();
    assert_eq!(delta.stats[Category::Blk], 0.0);
    assert_eq!(delta.missing, vec![Category::Blk]);
}

#[test]
fn test_scheduled_team_without_stats_is_reported() {
    let dir = TempDir::new().unwrap();
    let mut doc = league_season(2024, 1);
    doc.stats.retain(|s| s.team_id != TeamId::new(4));
    let engine = seeded(&dir, &doc);

    let expected = vec![DataQualityIssue::MissingTeamRow {
        week: Week::new(1),
        team_id: TeamId::new(4),
    }];
    let week = engine.week_power(Season::new(2024), Week::new(1)).unwrap();
    assert_eq!(week.data_quality, expected);
    assert!(week.rows.iter().all(|r| r.team_id != TeamId::new(4)));
    assert_eq!(
        engine.week_zscores(Season::new(2024), Week::new(1)).unwrap().data_quality,
        expected
    );

    // Charlie's game had no opponent row, so it is absent from the matrix
    let matrix = engine
        .opponent_matrix(TeamId::new(3), Season::new(2024), Season::new(2024), false)
        .unwrap();
    assert!(matrix.rows.is_empty());
}

#[test]
fn test_week_power_in_progress_week() {
    let dir = TempDir::new().unwrap();
    let mut doc = league_season(2024, 2);
    doc.stats.push(stat(2024, 3, 1, 10.0, false));
    doc.stats.push(stat(2024, 3, 2, 20.0, true));
    let engine = seeded(&dir, &doc);

    let week = engine.week_power(Season::new(2024), Week::new(3)).unwrap();
    assert!(!week.complete);
    assert_eq!(week.rows[0].team_id, TeamId::new(2));

    // In-progress weeks never reach the season aggregate
    let rows = engine.season_power(Season::new(2024)).unwrap();
    assert!(rows.iter().all(|r| r.weeks_played == 2));
}

#[test]
fn test_opponent_matrix_across_owner_change() {
    let dir = TempDir::new().unwrap();
    let mut doc = merge([league_season(2022, 3), league_season(2023, 3), league_season(2024, 3)]);
    // Team 1 changed hands in 2024
    for t in doc.teams.iter_mut() {
        if t.team_id == TeamId::new(1) && t.season == Season::new(2024) {
            *t = team(2024, 1, "Alpha Reborn", "NEW");
        }
    }
    let engine = seeded(&dir, &doc);

    let all = engine
        .opponent_matrix(TeamId::new(1), Season::new(2022), Season::new(2024), false)
        .unwrap();
    assert_eq!(all.rows.len(), 3);
    assert!(all.rows.iter().all(|r| r.overall.matchups == 3));
    assert!(all.rows.iter().all(|r| r.overall.win_pct == 1.0));

    let era = engine
        .opponent_matrix(TeamId::new(1), Season::new(2022), Season::new(2024), true)
        .unwrap();
    assert!(era.rows.iter().all(|r| r.overall.matchups == 1));

    // Opponent's view uses the latest name for team 1
    let bravo = engine
        .opponent_matrix(TeamId::new(2), Season::new(2022), Season::new(2024), false)
        .unwrap();
    assert!(bravo.rows.iter().any(|r| r.opponent_name == "Alpha Reborn"));
    for row in &bravo.rows {
        let o = &row.overall;
        assert_eq!(o.wins + o.losses + o.ties, o.matchups);
    }
}

#[test]
fn test_reversed_pairings_import_as_one_game() {
    let dir = TempDir::new().unwrap();
    let mut doc = league_season(2024, 1);
    let reversed: Vec<_> = doc
        .matchups
        .iter()
        .map(|m| {
            let mut r = *m;
            std::mem::swap(&mut r.home_team_id, &mut r.away_team_id);
            r
        })
        .collect();
    doc.matchups.extend(reversed);
    let engine = seeded(&dir, &doc);

    let matrix = engine
        .opponent_matrix(TeamId::new(1), Season::new(2024), Season::new(2024), false)
        .unwrap();
    assert_eq!(matrix.rows.len(), 1);
    let o = &matrix.rows[0].overall;
    assert_eq!(o.matchups, 1);
    assert_eq!(o.wins + o.losses + o.ties, o.matchups);

    let rows = engine.season_power(Season::new(2024)).unwrap();
    assert!(rows.iter().all(|r| r.luck.weeks == 1));
}

#[test]
fn test_owner_awards_follow_the_owner() {
    let dir = TempDir::new().unwrap();
    let mut doc = merge([league_season(2023, 3), league_season(2024, 3)]);
    // Owner DDD moves from team 4 to team 1 in 2024
    for t in doc.teams.iter_mut() {
        if t.season == Season::new(2024) {
            if t.team_id == TeamId::new(1) {
                t.owner_code = Some(OwnerCode::new("DDD"));
            } else if t.team_id == TeamId::new(4) {
                t.owner_code = Some(OwnerCode::new("AAA"));
            }
        }
    }
    let engine = seeded(&dir, &doc);

    let report = engine
        .awards(&AwardsRequest {
            scope: AwardScopeKind::Owner,
            mode: AwardMode::YearByYear,
            years: YearSelector::AllTime,
            team_id: None,
            owner: Some(OwnerCode::new("ddd")),
            owner_era_only: false,
        })
        .unwrap();
    let AwardsReport::YearByYear { seasons } = report else {
        panic!("expected a year-by-year report");
    };
    let best_week_team = |i: usize| {
        let award = seasons[i]
            .awards
            .iter()
            .find(|a| a.id.to_string() == "best_week")
            .unwrap();
        award.winners[0].team_id
    };
    assert_eq!(seasons.len(), 2);
    assert_eq!(best_week_team(0), TeamId::new(4));
    assert_eq!(best_week_team(1), TeamId::new(1));
}

#[test]
fn test_concurrent_reads_share_one_build() {
    let dir = TempDir::new().unwrap();
    let engine = seeded(&dir, &merge([league_season(2023, 3), league_season(2024, 3)]));

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.season_power(Season::new(2024)).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.windows(2).all(|w| w[0] == w[1]));

    let store = LeagueStore::open(&dir.path().join("league.db")).unwrap();
    let builds = store.aggregate_builds().unwrap();
    assert_eq!(builds.len(), 1);
    assert_eq!(builds[0].season, Season::new(2024));
}
