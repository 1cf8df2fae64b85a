//! Weekly and season power rankings.
//!
//! Ranking uses standard competition ranking ("1, 2, 2, 4"): tied entries
//! share the best rank and the next distinct entry skips. Ties are listed in
//! ascending team id order so repeated runs produce identical output.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::luck::{self, AllPlayRecord, LuckSummary, TeamWeekLuck};
use super::normalize::{DataQualityIssue, WeekZScores};
use super::SeasonFrame;
use crate::cli::types::{Category, CategoryMap, Season, TeamId, Week};


/// Competition ranks for items already sorted best-first.
///
/// `same(a, b)` decides whether two adjacent items tie.
pub fn competition_ranks<T>(sorted: &[T], same: impl Fn(&T, &T) -> bool) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(sorted.len());
    for (i, item) in sorted.iter().enumerate() {
        let rank = match i {
            0 => 1,
            _ if same(&sorted[i - 1], item) => ranks[i - 1],
            _ => i as u32 + 1,
        };
        ranks.push(rank);
    }
    ranks
}

/// Descending by score, ascending by team id.
fn by_score_desc(a: (f64, TeamId), b: (f64, TeamId)) -> Ordering {
    b.0.total_cmp(&a.0).then(a.1.cmp(&b.1))
}

/// Rank `(team, score)` pairs, highest score first.
fn rank_scores(scores: &[(TeamId, f64)]) -> HashMap<TeamId, u32> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| by_score_desc((a.1, a.0), (b.1, b.0)));
    let ranks = competition_ranks(&sorted, |a, b| a.1 == b.1);
    sorted.iter().map(|(team, _)| *team).zip(ranks).collect()
}

/// Per-category competition ranks for a set of per-team category values.
fn category_ranks(values: &[(TeamId, CategoryMap<f64>)]) -> HashMap<TeamId, CategoryMap<u32>> {
    let per_category: CategoryMap<HashMap<TeamId, u32>> = CategoryMap::from_fn(|cat| {
        let column: Vec<(TeamId, f64)> = values.iter().map(|(t, v)| (*t, v[cat])).collect();
        rank_scores(&column)
    });

    values
        .iter()
        .map(|(team, _)| {
            let ranks = per_category.map(|_, ranks| ranks.get(team).copied().unwrap_or(0));
            (*team, ranks)
        })
        .collect()
}

/// Weekly total-Z rank of every real team.
pub fn week_ranks(week: &WeekZScores) -> HashMap<TeamId, u32> {
    let scores: Vec<(TeamId, f64)> = week.teams().map(|r| (r.team_id, r.total_z)).collect();
    rank_scores(&scores)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPowerRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub is_league_average: bool,
    /// 0 for the league-average row.
    pub rank: u32,
    pub total_z: f64,
    pub per_category_z: CategoryMap<f64>,
    pub per_category_rank: CategoryMap<u32>,
    pub all_play: Option<AllPlayRecord>,
    pub luck_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekPower {
    pub season: Season,
    pub week: Week,
    pub complete: bool,
    pub rows: Vec<WeekPowerRow>,
    pub data_quality: Vec<DataQualityIssue>,
}

/// Rank one normalized week, attaching all-play and luck where available.
pub fn rank_week(week: &WeekZScores, luck: &[TeamWeekLuck]) -> WeekPower {
    let ranks = week_ranks(week);
    let cat_values: Vec<(TeamId, CategoryMap<f64>)> =
        week.teams().map(|r| (r.team_id, r.zscores)).collect();
    let cat_ranks = category_ranks(&cat_values);

    let mut rows: Vec<WeekPowerRow> = week
        .teams()
        .map(|r| {
            let team_luck = luck.iter().find(|l| l.team_id == r.team_id);
            WeekPowerRow {
                team_id: r.team_id,
                team_name: r.team_name.clone(),
                is_league_average: false,
                rank: ranks.get(&r.team_id).copied().unwrap_or(0),
                total_z: r.total_z,
                per_category_z: r.zscores,
                per_category_rank: cat_ranks.get(&r.team_id).copied().unwrap_or_default(),
                all_play: team_luck.and_then(|l| l.all_play),
                luck_index: team_luck.and_then(|l| l.luck_index()),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.rank.cmp(&b.rank).then(a.team_id.cmp(&b.team_id)));

    if let Some(avg) = week.league_average() {
        rows.push(WeekPowerRow {
            team_id: avg.team_id,
            team_name: avg.team_name.clone(),
            is_league_average: true,
            rank: 0,
            total_z: avg.total_z,
            per_category_z: avg.zscores,
            per_category_rank: CategoryMap::default(),
            all_play: None,
            luck_index: None,
        });
    }

    WeekPower {
        season: week.season,
        week: week.week,
        complete: week.complete,
        rows,
        data_quality: week.data_quality.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonPowerRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub rank: u32,
    pub weeks_played: u32,
    pub avg_total_z: f64,
    pub sum_total_z: f64,
    pub per_category_avg_z: CategoryMap<f64>,
    pub per_category_rank: CategoryMap<u32>,
    pub luck: LuckSummary,
}

#[derive(Default)]
struct SeasonAccumulator {
    team_name: String,
    weeks: u32,
    sum_total_z: f64,
    sum_category_z: CategoryMap<f64>,
    luck: Vec<TeamWeekLuck>,
}

/// Season power over the frame's completed weeks.
pub fn season_power(frame: &SeasonFrame) -> Vec<SeasonPowerRow> {
    let mut teams: BTreeMap<TeamId, SeasonAccumulator> = BTreeMap::new();

    for week in frame.completed_weeks() {
        for row in week.zscores.teams() {
            let acc = teams.entry(row.team_id).or_default();
            acc.team_name.clone_from(&row.team_name);
            acc.weeks += 1;
            acc.sum_total_z += row.total_z;
            for cat in Category::ALL {
                acc.sum_category_z[cat] += row.zscores[cat];
            }
        }
        for team_luck in &week.luck {
            if let Some(acc) = teams.get_mut(&team_luck.team_id) {
                acc.luck.push(*team_luck);
            }
        }
    }

    let mut rows: Vec<SeasonPowerRow> = teams
        .into_iter()
        .map(|(team_id, acc)| {
            let n = acc.weeks as f64;
            SeasonPowerRow {
                team_id,
                team_name: acc.team_name,
                rank: 0,
                weeks_played: acc.weeks,
                avg_total_z: acc.sum_total_z / n,
                sum_total_z: acc.sum_total_z,
                per_category_avg_z: acc.sum_category_z.map(|_, sum| sum / n),
                per_category_rank: CategoryMap::default(),
                luck: luck::summarize(&acc.luck),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.avg_total_z
            .total_cmp(&a.avg_total_z)
            .then(b.sum_total_z.total_cmp(&a.sum_total_z))
            .then(a.team_id.cmp(&b.team_id))
    });
    let ranks = competition_ranks(&rows, |a, b| {
        a.avg_total_z == b.avg_total_z && a.sum_total_z == b.sum_total_z
    });

    let cat_values: Vec<(TeamId, CategoryMap<f64>)> =
        rows.iter().map(|r| (r.team_id, r.per_category_avg_z)).collect();
    let cat_ranks = category_ranks(&cat_values);

    for (row, rank) in rows.iter_mut().zip(ranks) {
        row.rank = rank;
        row.per_category_rank = cat_ranks.get(&row.team_id).copied().unwrap_or_default();
    }
    rows
}
