//! Synthetic league data shared by the integration tests

#![allow(dead_code)]

use league_analytics::{
    storage::{LeagueImport, ScheduledMatchup, TeamSeason, WeeklyTeamStat},
    CategoryMap, OwnerCode, Season, TeamId, Week,
};

pub fn team(season: u16, id: u32, name: &str, owner: &str) -> TeamSeason {
    TeamSeason {
        season: Season::new(season),
        team_id: TeamId::new(id),
        team_name: name.to_string(),
        owner_code: Some(OwnerCode::new(owner)),
    }
}

pub fn stat(season: u16, week: u16, id: u32, level: f64, completed: bool) -> WeeklyTeamStat {
    WeeklyTeamStat {
        season: Season::new(season),
        week: Week::new(week),
        team_id: TeamId::new(id),
        values: CategoryMap::from_fn(|_| Some(level)),
        completed,
    }
}

pub fn matchup(season: u16, week: u16, home: u32, away: u32) -> ScheduledMatchup {
    ScheduledMatchup {
        season: Season::new(season),
        week: Week::new(week),
        home_team_id: TeamId::new(home),
        away_team_id: TeamId::new(away),
    }
}

/// Four teams over `weeks` completed weeks; team 1 strongest, team 4 weakest.
/// Pairings rotate 1v2/3v4, 1v3/2v4, 1v4/2v3.
pub fn league_season(season: u16, weeks: u16) -> LeagueImport {
    let teams = vec![
        team(season, 1, "Alpha", "AAA"),
        team(season, 2, "Bravo", "BBB"),
        team(season, 3, "Charlie", "CCC"),
        team(season, 4, "Delta", "DDD"),
    ];
    let mut stats = Vec::new();
    let mut matchups = Vec::new();
    for week in 1..=weeks {
        for id in 1..=4u32 {
            stats.push(stat(season, week, id, 50.0 - 10.0 * id as f64, true));
        }
        let (a, b) = match week % 3 {
            1 => ((1, 2), (3, 4)),
            2 => ((1, 3), (2, 4)),
            _ => ((1, 4), (2, 3)),
        };
        matchups.push(matchup(season, week, a.0, a.1));
        matchups.push(matchup(season, week, b.0, b.1));
    }
    LeagueImport {
        teams,
        stats,
        matchups,
    }
}

pub fn merge(docs: impl IntoIterator<Item = LeagueImport>) -> LeagueImport {
    let mut all = LeagueImport::default();
    for doc in docs {
        all.teams.extend(doc.teams);
        all.stats.extend(doc.stats);
        all.matchups.extend(doc.matchups);
    }
    all
}
