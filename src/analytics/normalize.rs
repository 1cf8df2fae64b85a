//! Weekly category normalization.
//!
//! Turns one week's raw per-team category totals into z-scores per category
//! and a total Z. The distribution for each category is taken over the real
//! teams only; the synthetic league-average row is derived afterwards, so its
//! raw values are the category means and its z-scores are exactly zero.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cli::types::{Category, CategoryMap, Season, TeamId, Week},
    storage::models::WeeklyTeamStat,
};


/// Display name of the synthetic league-average row.
pub const LEAGUE_AVERAGE_NAME: &str = "League Average";

/// Standard deviations below this are treated as "all teams tied".
const STDEV_EPSILON: f64 = 1e-12;

/// Mean and population standard deviation of one category in one week.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryDistribution {
    pub mean: f64,
    pub stdev: f64,
}

/// Population (N-denominator) mean and standard deviation.
///
/// An empty slice yields `mean = 0, stdev = 0`.
pub fn distribution(values: &[f64]) -> CategoryDistribution {
    if values.is_empty() {
        return CategoryDistribution::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    CategoryDistribution {
        mean,
        stdev: variance.sqrt(),
    }
}

/// z-score of `value` against `dist`; 0 when the category is constant.
pub fn zscore(value: f64, dist: &CategoryDistribution) -> f64 {
    if dist.stdev < STDEV_EPSILON {
        return 0.0;
    }
    (value - dist.mean) / dist.stdev
}

/// One team's normalized week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryZRow {
    pub team_id: TeamId,
    pub team_name: String,
    pub is_league_average: bool,
    /// Raw category values as used for normalization (missing → 0).
    pub stats: CategoryMap<f64>,
    pub zscores: CategoryMap<f64>,
    pub total_z: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<Category>,
}

/// Partial-data signal surfaced alongside a week's result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum DataQualityIssue {
    /// The provider did not supply `category` for `team_id`; treated as 0.
    MissingCategory { team_id: TeamId, category: Category },
    /// `team_id` was scheduled this week but has no stat row; its game is
    /// left out of luck and the opponent matrix.
    MissingTeamRow { week: Week, team_id: TeamId },
}

/// Normalization result for one (season, week)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekZScores {
    pub season: Season,
    pub week: Week,
    /// True when every team row for the week is flagged completed.
    pub complete: bool,
    pub distributions: CategoryMap<CategoryDistribution>,
    /// Real teams ordered by team id, followed by the league-average row.
    pub rows: Vec<CategoryZRow>,
    pub data_quality: Vec<DataQualityIssue>,
}

impl WeekZScores {
    /// Real teams only.
    pub fn teams(&self) -> impl Iterator<Item = &CategoryZRow> {
        self.rows.iter().filter(|r| !r.is_league_average)
    }

    pub fn team_count(&self) -> usize {
        self.teams().count()
    }

    pub fn league_average(&self) -> Option<&CategoryZRow> {
        self.rows.iter().find(|r| r.is_league_average)
    }

    pub fn row(&self, team_id: TeamId) -> Option<&CategoryZRow> {
        self.teams().find(|r| r.team_id == team_id)
    }
}

/// Normalize one week of raw stats.
///
/// `names` maps team ids to display names; unknown ids fall back to `Team <id>`.
pub fn normalize_week(
    season: Season,
    week: Week,
    stats: &[&WeeklyTeamStat],
    names: &HashMap<TeamId, String>,
) -> WeekZScores {
    let mut ordered: Vec<&WeeklyTeamStat> = stats.to_vec();
    ordered.sort_by_key(|s| s.team_id);
    ordered.dedup_by_key(|s| s.team_id);

    let mut data_quality = Vec::new();
    let mut raw: Vec<(TeamId, CategoryMap<f64>, Vec<Category>)> = Vec::with_capacity(ordered.len());

    for stat in &ordered {
        let mut missing = Vec::new();
        let values = stat.values.map(|cat, value| match value {
            Some(v) if v.is_finite() => *v,
            _ => {
                missing.push(cat);
                0.0
            }
        });

        for &category in &missing {
            if stat.completed {
                warn!(
                    season = %season,
                    week = %week,
                    team_id = %stat.team_id,
                    category = %category,
                    "completed week is missing a category value; treating as 0"
                );
            } else {
                debug!(team_id = %stat.team_id, category = %category, "in-progress week missing category");
            }
            data_quality.push(DataQualityIssue::MissingCategory {
                team_id: stat.team_id,
                category,
            });
        }

        raw.push((stat.team_id, values, missing));
    }

    let distributions = CategoryMap::from_fn(|cat| {
        let column: Vec<f64> = raw.iter().map(|(_, values, _)| values[cat]).collect();
        distribution(&column)
    });

    let mut rows: Vec<CategoryZRow> = raw
        .into_iter()
        .map(|(team_id, values, missing)| {
            let zscores = values.map(|cat, v| zscore(*v, &distributions[cat]));
            CategoryZRow {
                team_id,
                team_name: names
                    .get(&team_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Team {}", team_id)),
                is_league_average: false,
                stats: values,
                total_z: zscores.total(),
                zscores,
                missing,
            }
        })
        .collect();

    if !rows.is_empty() {
        let stats = distributions.map(|_, d| d.mean);
        let zscores = stats.map(|cat, v| zscore(*v, &distributions[cat]));
        rows.push(CategoryZRow {
            team_id: TeamId::LEAGUE_AVERAGE,
            team_name: LEAGUE_AVERAGE_NAME.to_string(),
            is_league_average: true,
            stats,
            total_z: zscores.total(),
            zscores,
            missing: Vec::new(),
        });
    }

    WeekZScores {
        season,
        week,
        complete: !ordered.is_empty() && ordered.iter().all(|s| s.completed),
        distributions,
        rows,
        data_quality,
    }
}

/// Normalize every week present in `stats`, ascending by week.
pub fn normalize_season(
    season: Season,
    stats: &[WeeklyTeamStat],
    names: &HashMap<TeamId, String>,
) -> Vec<WeekZScores> {
    let mut by_week: BTreeMap<Week, Vec<&WeeklyTeamStat>> = BTreeMap::new();
    for stat in stats.iter().filter(|s| s.season == season) {
        by_week.entry(stat.week).or_default().push(stat);
    }

    by_week
        .into_iter()
        .map(|(week, rows)| normalize_week(season, week, &rows, names))
        .collect()
}
