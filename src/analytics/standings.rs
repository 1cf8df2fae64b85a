//! Season standings.
//!
//! Every scheduled game in a completed week counts once. A game goes to
//! whoever took more categories; the category record adds up the individual
//! category results. Teams are ordered by matchup wins, then matchup ties,
//! then category wins, then fewest matchup losses. Teams equal on all four
//! share a rank and are listed by team id.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::matchup::{self, MatchOutcome};
use super::normalize::CategoryZRow;
use super::power::competition_ranks;
use super::SeasonFrame;
use crate::cli::types::{Season, TeamId, Week};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinLossTie {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl WinLossTie {
    fn add(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Tie => self.ties += 1,
        }
    }

    fn add_counts(&mut self, wins: u32, losses: u32, ties: u32) {
        self.wins += wins;
        self.losses += losses;
        self.ties += ties;
    }

    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.ties
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub rank: u32,
    pub matchup: WinLossTie,
    pub categories: WinLossTie,
}

impl StandingsRow {
    fn sort_key(&self) -> (u32, u32, u32, Reverse<u32>) {
        (
            self.matchup.wins,
            self.matchup.ties,
            self.categories.wins,
            Reverse(self.matchup.losses),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standings {
    pub season: Season,
    pub completed_weeks: Vec<Week>,
    pub rows: Vec<StandingsRow>,
}

impl Standings {
    pub fn empty(season: Season) -> Self {
        Self {
            season,
            completed_weeks: Vec::new(),
            rows: Vec::new(),
        }
    }
}

fn row_for<'a>(teams: &'a mut BTreeMap<TeamId, StandingsRow>, team: &CategoryZRow) -> &'a mut StandingsRow {
    teams.entry(team.team_id).or_insert_with(|| StandingsRow {
        team_id: team.team_id,
        team_name: team.team_name.clone(),
        rank: 0,
        matchup: WinLossTie::default(),
        categories: WinLossTie::default(),
    })
}

/// Standings over the frame's completed weeks.
pub fn season_standings(frame: &SeasonFrame) -> Standings {
    let mut teams: BTreeMap<TeamId, StandingsRow> = BTreeMap::new();
    let mut completed_weeks = Vec::new();

    for week in frame.completed_weeks() {
        completed_weeks.push(week.zscores.week);
        for (home, away) in week.scored_pairings() {
            let tally = matchup::compare(&home.zscores, &away.zscores);
            let outcome = tally.outcome();
            let (won, lost, tied) = (tally.wins(), tally.losses(), tally.ties());

            let row = row_for(&mut teams, home);
            row.matchup.add(outcome);
            row.categories.add_counts(won, lost, tied);

            let row = row_for(&mut teams, away);
            row.matchup.add(outcome.flip());
            row.categories.add_counts(lost, won, tied);
        }
    }

    let mut rows: Vec<StandingsRow> = teams.into_values().collect();
    rows.sort_by(|a, b| b.sort_key().cmp(&a.sort_key()).then(a.team_id.cmp(&b.team_id)));
    let ranks = competition_ranks(&rows, |a, b| a.sort_key() == b.sort_key());
    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
    }

    Standings {
        season: frame.season,
        completed_weeks,
        rows,
    }
}
