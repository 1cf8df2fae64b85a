//! Award catalog, scope resolution and winner selection.
//!
//! An award is a comparator (max or min) over one value field of the weekly
//! history entries or the season power rows. Every candidate equal to the
//! best value wins, so ties produce several winners.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::history::TeamHistory;
use super::owners::{OwnershipIndex, SeasonTeam};
use super::power::SeasonPowerRow;
use crate::cli::types::{AwardMode, AwardScopeKind, Category, OwnerCode, Season, TeamId, Week};
use crate::error::{AnalyticsError, Result};


/// Value an award compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwardMetric {
    /// Weekly total Z.
    Week,
    /// Season average total Z.
    Season,
    WeekCategory(Category),
    SeasonCategory(Category),
    /// Season luck (actual minus all-play win percentage).
    Luck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwardDirection {
    /// Highest value wins.
    Best,
    /// Lowest value wins.
    Worst,
}

/// A single catalog entry, e.g. `best_week_pts` or `unluckiest_season`.
///
/// # Examples
///
/// ```rust
/// use league_analytics::analytics::awards::AwardId;
///
/// let id: AwardId = "worst_season_3pm".parse().unwrap();
/// assert_eq!(id.to_string(), "worst_season_3pm");
/// assert_eq!(id.label(), "Worst 3PM Season");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AwardId {
    pub metric: AwardMetric,
    pub direction: AwardDirection,
}

impl AwardId {
    pub fn new(metric: AwardMetric, direction: AwardDirection) -> Self {
        Self { metric, direction }
    }

    pub fn label(&self) -> String {
        let adjective = match self.direction {
            AwardDirection::Best => "Best",
            AwardDirection::Worst => "Worst",
        };
        match self.metric {
            AwardMetric::Week => format!("{adjective} Week"),
            AwardMetric::Season => format!("{adjective} Season"),
            AwardMetric::WeekCategory(cat) => format!("{adjective} {} Week", cat.label()),
            AwardMetric::SeasonCategory(cat) => format!("{adjective} {} Season", cat.label()),
            AwardMetric::Luck => match self.direction {
                AwardDirection::Best => "Luckiest Season".to_string(),
                AwardDirection::Worst => "Unluckiest Season".to_string(),
            },
        }
    }
}

impl fmt::Display for AwardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.direction {
            AwardDirection::Best => "best",
            AwardDirection::Worst => "worst",
        };
        match self.metric {
            AwardMetric::Week => write!(f, "{prefix}_week"),
            AwardMetric::Season => write!(f, "{prefix}_season"),
            AwardMetric::WeekCategory(cat) => write!(f, "{prefix}_week_{}", cat.slug()),
            AwardMetric::SeasonCategory(cat) => write!(f, "{prefix}_season_{}", cat.slug()),
            AwardMetric::Luck => match self.direction {
                AwardDirection::Best => f.write_str("luckiest_season"),
                AwardDirection::Worst => f.write_str("unluckiest_season"),
            },
        }
    }
}

impl FromStr for AwardId {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().to_lowercase();
        let invalid = || AnalyticsError::InvalidAward { id: s.to_string() };

        match id.as_str() {
            "luckiest_season" => return Ok(Self::new(AwardMetric::Luck, AwardDirection::Best)),
            "unluckiest_season" => return Ok(Self::new(AwardMetric::Luck, AwardDirection::Worst)),
            _ => {}
        }

        let (direction, rest) = if let Some(rest) = id.strip_prefix("best_") {
            (AwardDirection::Best, rest)
        } else if let Some(rest) = id.strip_prefix("worst_") {
            (AwardDirection::Worst, rest)
        } else {
            return Err(invalid());
        };

        let metric = match rest {
            "week" => AwardMetric::Week,
            "season" => AwardMetric::Season,
            _ => {
                if let Some(cat) = rest.strip_prefix("week_") {
                    AwardMetric::WeekCategory(cat.parse().map_err(|_| invalid())?)
                } else if let Some(cat) = rest.strip_prefix("season_") {
                    AwardMetric::SeasonCategory(cat.parse().map_err(|_| invalid())?)
                } else {
                    return Err(invalid());
                }
            }
        };
        Ok(Self::new(metric, direction))
    }
}

impl Serialize for AwardId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AwardId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The set of awards the engine reports, in display order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwardCatalog {
    ids: Vec<AwardId>,
}

impl AwardCatalog {
    /// Every award: week, season, per-category week and season, then luck.
    pub fn all() -> Self {
        let mut ids = Vec::new();
        for metric in [AwardMetric::Week, AwardMetric::Season] {
            ids.push(AwardId::new(metric, AwardDirection::Best));
            ids.push(AwardId::new(metric, AwardDirection::Worst));
        }
        for cat in Category::ALL {
            for metric in [AwardMetric::WeekCategory(cat), AwardMetric::SeasonCategory(cat)] {
                ids.push(AwardId::new(metric, AwardDirection::Best));
                ids.push(AwardId::new(metric, AwardDirection::Worst));
            }
        }
        ids.push(AwardId::new(AwardMetric::Luck, AwardDirection::Best));
        ids.push(AwardId::new(AwardMetric::Luck, AwardDirection::Worst));
        Self { ids }
    }

    /// Catalog from explicit ids; any unknown id fails the whole catalog.
    pub fn from_ids<S: AsRef<str>>(ids: &[S]) -> Result<Self> {
        let mut parsed: Vec<AwardId> = Vec::with_capacity(ids.len());
        for raw in ids.iter().map(|s| s.as_ref()).filter(|s| !s.trim().is_empty()) {
            let id: AwardId = raw.parse()?;
            if !parsed.contains(&id) {
                parsed.push(id);
            }
        }
        Ok(Self { ids: parsed })
    }

    pub fn ids(&self) -> &[AwardId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for AwardCatalog {
    fn default() -> Self {
        Self::all()
    }
}

/// One season or every known season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSelector {
    Season(Season),
    #[default]
    AllTime,
}

impl YearSelector {
    /// Seasons selected out of `known`, ascending.
    pub fn resolve(&self, known: &[Season]) -> Vec<Season> {
        let mut seasons: Vec<Season> = match self {
            YearSelector::Season(s) => known.iter().copied().filter(|k| k == s).collect(),
            YearSelector::AllTime => known.to_vec(),
        };
        seasons.sort();
        seasons.dedup();
        seasons
    }
}

/// Unvalidated awards request as it arrives from a caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardsRequest {
    pub scope: AwardScopeKind,
    pub mode: AwardMode,
    pub years: YearSelector,
    pub team_id: Option<TeamId>,
    pub owner: Option<OwnerCode>,
    pub owner_era_only: bool,
}

/// A validated awards query; one variant per supported scope and mode pair.
///
/// A team or owner scope with no id is valid and simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AwardsQuery {
    LeagueSummary {
        years: YearSelector,
    },
    TeamSummary {
        team_id: Option<TeamId>,
        years: YearSelector,
        owner_era_only: bool,
    },
    TeamYearByYear {
        team_id: Option<TeamId>,
        years: YearSelector,
        owner_era_only: bool,
    },
    OwnerSummary {
        owner: Option<OwnerCode>,
        years: YearSelector,
        owner_era_only: bool,
    },
    OwnerYearByYear {
        owner: Option<OwnerCode>,
        years: YearSelector,
        owner_era_only: bool,
    },
}

impl TryFrom<AwardsRequest> for AwardsQuery {
    type Error = AnalyticsError;

    fn try_from(req: AwardsRequest) -> Result<Self> {
        let AwardsRequest {
            scope,
            mode,
            years,
            team_id,
            owner,
            owner_era_only,
        } = req;

        Ok(match (scope, mode) {
            (AwardScopeKind::League, AwardMode::Summary) => AwardsQuery::LeagueSummary { years },
            (AwardScopeKind::League, AwardMode::YearByYear) => {
                return Err(AnalyticsError::UnsupportedAwardMode {
                    scope: scope.to_string(),
                    mode: mode.to_string(),
                })
            }
            (AwardScopeKind::Team, AwardMode::Summary) => AwardsQuery::TeamSummary {
                team_id,
                years,
                owner_era_only,
            },
            (AwardScopeKind::Team, AwardMode::YearByYear) => AwardsQuery::TeamYearByYear {
                team_id,
                years,
                owner_era_only,
            },
            (AwardScopeKind::Owner, AwardMode::Summary) => AwardsQuery::OwnerSummary {
                owner,
                years,
                owner_era_only,
            },
            (AwardScopeKind::Owner, AwardMode::YearByYear) => AwardsQuery::OwnerYearByYear {
                owner,
                years,
                owner_era_only,
            },
        })
    }
}

/// Teams eligible in one season
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligible {
    AllTeams,
    Teams(BTreeSet<TeamId>),
}

impl Eligible {
    pub fn contains(&self, team_id: TeamId) -> bool {
        match self {
            Eligible::AllTeams => true,
            Eligible::Teams(teams) => teams.contains(&team_id),
        }
    }
}

impl AwardsQuery {
    pub fn years(&self) -> YearSelector {
        match self {
            AwardsQuery::LeagueSummary { years }
            | AwardsQuery::TeamSummary { years, .. }
            | AwardsQuery::TeamYearByYear { years, .. }
            | AwardsQuery::OwnerSummary { years, .. }
            | AwardsQuery::OwnerYearByYear { years, .. } => *years,
        }
    }

    pub fn is_year_by_year(&self) -> bool {
        matches!(
            self,
            AwardsQuery::TeamYearByYear { .. } | AwardsQuery::OwnerYearByYear { .. }
        )
    }

    /// Which teams count in which of the `seasons`.
    ///
    /// Seasons with nobody eligible are left out.
    pub fn eligibility(&self, ownership: &OwnershipIndex, seasons: &[Season]) -> BTreeMap<Season, Eligible> {
        let selected: BTreeSet<Season> = seasons.iter().copied().collect();

        let slots: Vec<SeasonTeam> = match self {
            AwardsQuery::LeagueSummary { .. } => {
                return selected.into_iter().map(|s| (s, Eligible::AllTeams)).collect();
            }
            AwardsQuery::TeamSummary {
                team_id,
                owner_era_only,
                ..
            }
            | AwardsQuery::TeamYearByYear {
                team_id,
                owner_era_only,
                ..
            } => match (team_id, owner_era_only) {
                (None, _) => Vec::new(),
                (Some(team), true) => ownership.team_current_era(*team),
                (Some(team), false) => selected.iter().map(|s| (*s, *team)).collect(),
            },
            AwardsQuery::OwnerSummary {
                owner,
                owner_era_only,
                ..
            }
            | AwardsQuery::OwnerYearByYear {
                owner,
                owner_era_only,
                ..
            } => match (owner, owner_era_only) {
                (None, _) => Vec::new(),
                (Some(owner), true) => ownership.owner_current_era(owner),
                (Some(owner), false) => ownership.owner_seasons(owner),
            },
        };

        let mut eligible: BTreeMap<Season, BTreeSet<TeamId>> = BTreeMap::new();
        for (season, team) in slots.into_iter().filter(|(s, _)| selected.contains(s)) {
            eligible.entry(season).or_default().insert(team);
        }
        eligible
            .into_iter()
            .map(|(season, teams)| (season, Eligible::Teams(teams)))
            .collect()
    }
}

/// Everything the composer reads for one season, already scoped
#[derive(Debug, Clone, Default)]
pub struct SeasonAwardInput {
    pub season: Season,
    pub power: Vec<SeasonPowerRow>,
    pub histories: Vec<TeamHistory>,
    pub owners: HashMap<TeamId, OwnerCode>,
}

impl SeasonAwardInput {
    /// Keep only rows for eligible teams.
    pub fn restricted(
        season: Season,
        power: &[SeasonPowerRow],
        histories: &[TeamHistory],
        owners: HashMap<TeamId, OwnerCode>,
        eligible: &Eligible,
    ) -> Self {
        Self {
            season,
            power: power
                .iter()
                .filter(|r| eligible.contains(r.team_id))
                .cloned()
                .collect(),
            histories: histories
                .iter()
                .filter(|h| eligible.contains(h.team_id))
                .cloned()
                .collect(),
            owners,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardWinner {
    pub season: Season,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<Week>,
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_code: Option<OwnerCode>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_win_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_win_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub luck: Option<f64>,
}

impl AwardWinner {
    fn new(input: &SeasonAwardInput, week: Option<Week>, team_id: TeamId, team_name: &str, value: f64) -> Self {
        Self {
            season: input.season,
            week,
            team_id,
            team_name: team_name.to_string(),
            owner_code: input.owners.get(&team_id).cloned(),
            value,
            raw_value: None,
            actual_win_pct: None,
            expected_win_pct: None,
            luck: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: AwardId,
    pub label: String,
    pub winners: Vec<AwardWinner>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonAwards {
    pub season: Season,
    pub awards: Vec<Award>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AwardsReport {
    Summary { awards: Vec<Award> },
    YearByYear { seasons: Vec<SeasonAwards> },
}

fn candidates(id: &AwardId, input: &SeasonAwardInput) -> Vec<AwardWinner> {
    match id.metric {
        AwardMetric::Week => input
            .histories
            .iter()
            .flat_map(|h| {
                let name = h.team_name.as_deref().unwrap_or_default();
                h.entries
                    .iter()
                    .map(move |e| AwardWinner::new(input, Some(e.week), h.team_id, name, e.total_z))
            })
            .collect(),
        AwardMetric::WeekCategory(cat) => input
            .histories
            .iter()
            .flat_map(|h| {
                let name = h.team_name.as_deref().unwrap_or_default();
                h.entries.iter().map(move |e| AwardWinner {
                    raw_value: Some(e.stats[cat]),
                    ..AwardWinner::new(input, Some(e.week), h.team_id, name, e.zscores[cat])
                })
            })
            .collect(),
        AwardMetric::Season => input
            .power
            .iter()
            .filter(|r| r.weeks_played > 0)
            .map(|r| AwardWinner {
                raw_value: Some(r.sum_total_z),
                ..AwardWinner::new(input, None, r.team_id, &r.team_name, r.avg_total_z)
            })
            .collect(),
        AwardMetric::SeasonCategory(cat) => input
            .power
            .iter()
            .filter(|r| r.weeks_played > 0)
            .map(|r| {
                let raw = input
                    .histories
                    .iter()
                    .find(|h| h.team_id == r.team_id && !h.entries.is_empty())
                    .map(|h| h.entries.iter().map(|e| e.stats[cat]).sum::<f64>() / h.entries.len() as f64);
                AwardWinner {
                    raw_value: raw,
                    ..AwardWinner::new(input, None, r.team_id, &r.team_name, r.per_category_avg_z[cat])
                }
            })
            .collect(),
        AwardMetric::Luck => input
            .power
            .iter()
            .filter(|r| r.luck.weeks > 0)
            .map(|r| AwardWinner {
                actual_win_pct: Some(r.luck.actual_win_pct),
                expected_win_pct: Some(r.luck.expected_win_pct),
                luck: Some(r.luck.luck),
                ..AwardWinner::new(input, None, r.team_id, &r.team_name, r.luck.luck)
            })
            .collect(),
    }
}

/// Pick every candidate equal to the best value under `direction`.
fn select(direction: AwardDirection, candidates: Vec<AwardWinner>) -> Vec<AwardWinner> {
    let finite: Vec<AwardWinner> = candidates
        .into_iter()
        .filter(|c| c.value.is_finite())
        .collect();
    let best = finite.iter().map(|c| c.value).reduce(|a, b| match direction {
        AwardDirection::Best => a.max(b),
        AwardDirection::Worst => a.min(b),
    });
    let Some(best) = best else {
        return Vec::new();
    };

    let mut winners: Vec<AwardWinner> = finite.into_iter().filter(|c| c.value == best).collect();
    winners.sort_by(|a, b| {
        a.season
            .cmp(&b.season)
            .then(a.week.cmp(&b.week))
            .then(a.team_id.cmp(&b.team_id))
    });
    winners
}

/// Compose every catalog award over `inputs`, scanning seasons in parallel.
pub fn compose(catalog: &AwardCatalog, inputs: &[SeasonAwardInput]) -> Vec<Award> {
    catalog
        .ids()
        .iter()
        .map(|id| {
            let pool: Vec<AwardWinner> = inputs
                .par_iter()
                .flat_map_iter(|input| candidates(id, input))
                .collect();
            Award {
                id: *id,
                label: id.label(),
                winners: select(id.direction, pool),
            }
        })
        .collect()
}

/// Summary folds every season together; year-by-year reports each season.
pub fn build_report(query: &AwardsQuery, catalog: &AwardCatalog, inputs: &[SeasonAwardInput]) -> AwardsReport {
    if query.is_year_by_year() {
        let mut seasons: Vec<SeasonAwards> = inputs
            .iter()
            .map(|input| SeasonAwards {
                season: input.season,
                awards: compose(catalog, std::slice::from_ref(input)),
            })
            .collect();
        seasons.sort_by_key(|s| s.season);
        AwardsReport::YearByYear { seasons }
    } else {
        AwardsReport::Summary {
            awards: compose(catalog, inputs),
        }
    }
}
