//! The analytics engine: lazy, cached access to every derived aggregate.
//!
//! Reads go memory tier, then the persisted aggregate tables, then a lazy
//! rebuild of just the missing (family, season). Rebuilds hold a per-key
//! lock, compute every season in parallel, then swap the persisted rows in
//! one transaction per family and season before invalidating the memory tier.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use crate::analytics::{
    awards::{self, AwardCatalog, AwardsQuery, AwardsReport, AwardsRequest, SeasonAwardInput},
    history::{self, TeamHistory},
    luck,
    normalize::{self, WeekZScores},
    opponents::{self, OpponentMatrix, OpponentSeasonRecord},
    owners::OwnershipIndex,
    power::{self, SeasonPowerRow, WeekPower},
    standings::{self, Standings},
    SeasonFrame,
};
use crate::cli::types::{OwnerCode, RebuildKind, Season, TeamId, Week};
use crate::core::cache::{
    lock, AggregateKey, AwardsKey, CacheManager, CacheSettings, KeyedLocks, OpponentMatrixKey,
    SeasonKey, UnifiedCache,
};
use crate::error::{AnalyticsError, Result};
use crate::storage::{
    AggregateFamily, ImportSummary, LeagueImport, LeagueStore, ScheduledMatchup, SeasonData,
    WeeklyTeamStat,
};


/// Which seasons a rebuild covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonSelector {
    Season(Season),
    /// Every season with source data in `min..=max`.
    Range { min: Season, max: Season },
    /// Every season with source data.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RebuildStatus {
    Rebuilt { rows: usize },
    /// Already built and not forced.
    Skipped,
    NoSourceData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildOutcome {
    pub family: AggregateFamily,
    pub season: Season,
    #[serde(flatten)]
    pub status: RebuildStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildReport {
    pub outcomes: Vec<RebuildOutcome>,
}

impl RebuildReport {
    pub fn rebuilt(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RebuildStatus::Rebuilt { .. }))
            .count()
    }
}

/// Families a rebuild kind expands to
pub fn families(kind: RebuildKind) -> &'static [AggregateFamily] {
    match kind {
        RebuildKind::SeasonPower => &[AggregateFamily::SeasonPower],
        RebuildKind::TeamHistory => &[AggregateFamily::TeamHistory],
        RebuildKind::OpponentMatrix => &[AggregateFamily::OpponentMatrix],
        RebuildKind::All => &AggregateFamily::ALL,
    }
}

/// One freshly computed per-season aggregate
enum Built {
    SeasonPower(Vec<SeasonPowerRow>),
    TeamHistory(Vec<TeamHistory>),
    OpponentMatrix(Vec<OpponentSeasonRecord>),
}

impl Built {
    fn compute(family: AggregateFamily, frame: &SeasonFrame) -> Self {
        match family {
            AggregateFamily::SeasonPower => Built::SeasonPower(power::season_power(frame)),
            AggregateFamily::TeamHistory => Built::TeamHistory(history::build_all(frame)),
            AggregateFamily::OpponentMatrix => {
                Built::OpponentMatrix(opponents::season_records(frame))
            }
        }
    }

    fn family(&self) -> AggregateFamily {
        match self {
            Built::SeasonPower(_) => AggregateFamily::SeasonPower,
            Built::TeamHistory(_) => AggregateFamily::TeamHistory,
            Built::OpponentMatrix(_) => AggregateFamily::OpponentMatrix,
        }
    }

    /// Persisted row count, matching the build marker
    fn rows(&self) -> usize {
        match self {
            Built::SeasonPower(rows) => rows.len(),
            Built::TeamHistory(histories) => histories.iter().map(|h| h.entries.len()).sum(),
            Built::OpponentMatrix(records) => records.len(),
        }
    }

    fn persist(&self, store: &mut LeagueStore, season: Season) -> anyhow::Result<()> {
        match self {
            Built::SeasonPower(rows) => store.replace_season_power(season, rows),
            Built::TeamHistory(histories) => store.replace_team_histories(season, histories),
            Built::OpponentMatrix(records) => store.replace_opponent_records(season, records),
        }
    }
}

pub struct AnalyticsEngine {
    store: Mutex<LeagueStore>,
    cache: CacheManager,
    locks: KeyedLocks,
    catalog: AwardCatalog,
}

impl AnalyticsEngine {
    pub fn new(store: LeagueStore, catalog: AwardCatalog, settings: CacheSettings) -> Self {
        Self {
            store: Mutex::new(store),
            cache: CacheManager::new(settings),
            locks: KeyedLocks::new(),
            catalog,
        }
    }

    /// Full award catalog and default cache sizes
    pub fn with_defaults(store: LeagueStore) -> Self {
        Self::new(store, AwardCatalog::all(), CacheSettings::default())
    }

    fn store(&self) -> MutexGuard<'_, LeagueStore> {
        lock(&self.store)
    }

    pub fn catalog(&self) -> &AwardCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Seasons with any source data, ascending
    pub fn seasons(&self) -> Result<Vec<Season>> {
        Ok(self.store().list_seasons()?)
    }

    /// Write an import document. Persisted aggregates are left as they are
    /// until the next rebuild; the memory tier is dropped.
    pub fn import(&self, doc: &LeagueImport) -> Result<ImportSummary> {
        let summary = self.store().import(doc)?;
        self.cache.clear_all_memory();
        Ok(summary)
    }

    /// Normalized week plus its schedule, with schedule gaps flagged
    fn week_frame(&self, season: Season, week: Week) -> Result<(WeekZScores, Vec<ScheduledMatchup>)> {
        let (stats, teams, matchups) = {
            let store = self.store();
            (
                store.weekly_stats_for_week(season, week)?,
                store.team_seasons(Some(season))?,
                store.matchups_for_season(season)?,
            )
        };
        let names: HashMap<TeamId, String> =
            teams.into_iter().map(|t| (t.team_id, t.team_name)).collect();
        let rows: Vec<&WeeklyTeamStat> = stats.iter().collect();
        let matchups: Vec<ScheduledMatchup> = matchups.into_iter().filter(|m| m.week == week).collect();

        let mut zscores = normalize::normalize_week(season, week, &rows, &names);
        luck::flag_missing_rows(&mut zscores, &matchups);
        Ok((zscores, matchups))
    }

    /// Category z-scores for one week, computed fresh
    pub fn week_zscores(&self, season: Season, week: Week) -> Result<WeekZScores> {
        Ok(self.week_frame(season, week)?.0)
    }

    /// Power ranking for one week, with all-play and luck where scheduled
    pub fn week_power(&self, season: Season, week: Week) -> Result<WeekPower> {
        let (zscores, matchups) = self.week_frame(season, week)?;
        let week_luck = luck::evaluate_week(&zscores, &matchups);
        Ok(power::rank_week(&zscores, &week_luck))
    }

    /// Every week of a season normalized, in-progress weeks included
    pub fn season_zscores(&self, season: Season) -> Result<Vec<WeekZScores>> {
        let data = self.store().load_season(season)?;
        Ok(SeasonFrame::build(&data)
            .weeks
            .into_iter()
            .map(|w| w.zscores)
            .collect())
    }

    /// Matchup and category W-L-T over completed weeks, computed fresh
    pub fn standings(&self, season: Season) -> Result<Standings> {
        let data = self.store().load_season(season)?;
        if data.is_empty() {
            return Ok(Standings::empty(season));
        }
        Ok(standings::season_standings(&SeasonFrame::build(&data)))
    }

    pub fn season_power(&self, season: Season) -> Result<Vec<SeasonPowerRow>> {
        let rows = self.cached_season(
            AggregateFamily::SeasonPower,
            season,
            &self.cache.season_power,
            LeagueStore::load_season_power,
        )?;
        Ok(rows.as_ref().clone())
    }

    /// One team's week-by-week trajectory; empty when the team has no weeks
    pub fn team_history(&self, season: Season, team_id: TeamId) -> Result<TeamHistory> {
        let histories = self.cached_season(
            AggregateFamily::TeamHistory,
            season,
            &self.cache.team_history,
            LeagueStore::load_team_histories,
        )?;
        Ok(histories
            .iter()
            .find(|h| h.team_id == team_id)
            .cloned()
            .unwrap_or_else(|| TeamHistory::empty(season, team_id)))
    }

    /// Head-to-head record against every opponent across a season range
    pub fn opponent_matrix(
        &self,
        team_id: TeamId,
        min_season: Season,
        max_season: Season,
        owner_era_only: bool,
    ) -> Result<OpponentMatrix> {
        opponents::validate_range(min_season, max_season)?;

        let key = OpponentMatrixKey {
            team_id,
            min_season,
            max_season,
            owner_era_only,
        };
        if let Some(hit) = self.cache.opponent_matrix.get(&key) {
            return Ok(hit.as_ref().clone());
        }

        let ownership = self.ownership()?;
        let era: Option<BTreeSet<Season>> = owner_era_only.then(|| {
            ownership
                .team_current_era(team_id)
                .into_iter()
                .map(|(season, _)| season)
                .collect()
        });
        let seasons: Vec<Season> = self
            .seasons()?
            .into_iter()
            .filter(|s| min_season <= *s && *s <= max_season)
            .filter(|s| era.as_ref().map_or(true, |era| era.contains(s)))
            .collect();

        self.ensure_built(AggregateFamily::OpponentMatrix, &seasons)?;
        let per_season = seasons
            .iter()
            .map(|&season| {
                self.cached_season(
                    AggregateFamily::OpponentMatrix,
                    season,
                    &self.cache.opponent_records,
                    LeagueStore::load_opponent_records,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = opponents::merge(team_id, per_season.iter().flat_map(|r| r.iter()), |id| {
            ownership.latest_team_name(id).map(str::to_string)
        });
        let matrix = OpponentMatrix {
            team_id,
            min_season,
            max_season,
            owner_era_only,
            rows,
        };
        self.cache.opponent_matrix.put(key, Arc::new(matrix.clone()));
        Ok(matrix)
    }

    /// Compose the configured award catalog for a scope, mode and year selection
    pub fn awards(&self, request: &AwardsRequest) -> Result<AwardsReport> {
        let query = AwardsQuery::try_from(request.clone())?;
        let key = AwardsKey(query.clone());
        if let Some(hit) = self.cache.awards.get(&key) {
            return Ok(hit.as_ref().clone());
        }

        let ownership = self.ownership()?;
        let seasons = query.years().resolve(&self.seasons()?);
        let eligibility = query.eligibility(&ownership, &seasons);
        let wanted: Vec<Season> = eligibility.keys().copied().collect();

        self.ensure_built(AggregateFamily::SeasonPower, &wanted)?;
        self.ensure_built(AggregateFamily::TeamHistory, &wanted)?;

        let mut inputs = Vec::with_capacity(eligibility.len());
        for (&season, eligible) in &eligibility {
            let power_rows = self.cached_season(
                AggregateFamily::SeasonPower,
                season,
                &self.cache.season_power,
                LeagueStore::load_season_power,
            )?;
            let histories = self.cached_season(
                AggregateFamily::TeamHistory,
                season,
                &self.cache.team_history,
                LeagueStore::load_team_histories,
            )?;
            let owners: HashMap<TeamId, OwnerCode> = power_rows
                .iter()
                .map(|r| r.team_id)
                .chain(histories.iter().map(|h| h.team_id))
                .filter_map(|team| ownership.owner_of(team, season).map(|o| (team, o.clone())))
                .collect();
            inputs.push(SeasonAwardInput::restricted(
                season,
                &power_rows,
                &histories,
                owners,
                eligible,
            ));
        }

        let report = awards::build_report(&query, &self.catalog, &inputs);
        self.cache.awards.put(key, Arc::new(report.clone()));
        Ok(report)
    }

    /// Recompute and atomically replace aggregates.
    ///
    /// Without `force`, families already built for a season are skipped.
    /// Fails with `NoSourceData` only when no selected season has source
    /// data; the previous aggregate is left untouched either way.
    pub fn rebuild(
        &self,
        kind: RebuildKind,
        selector: SeasonSelector,
        force: bool,
    ) -> Result<RebuildReport> {
        let seasons = match selector {
            SeasonSelector::Season(season) => vec![season],
            SeasonSelector::Range { min, max } => {
                opponents::validate_range(min, max)?;
                let seasons: Vec<Season> = self
                    .seasons()?
                    .into_iter()
                    .filter(|s| min <= *s && *s <= max)
                    .collect();
                if seasons.is_empty() {
                    return Err(AnalyticsError::NoSourceData {
                        season: min.as_u16(),
                    });
                }
                seasons
            }
            SeasonSelector::All => self.seasons()?,
        };
        self.rebuild_seasons(families(kind), &seasons, force)
    }

    fn rebuild_seasons(
        &self,
        families: &[AggregateFamily],
        seasons: &[Season],
        force: bool,
    ) -> Result<RebuildReport> {
        let keys: Vec<AggregateKey> = seasons
            .iter()
            .flat_map(|&season| {
                families
                    .iter()
                    .map(move |&family| AggregateKey { family, season })
            })
            .collect();
        let handles = self.locks.handles(&keys);
        let _guards: Vec<MutexGuard<'_, ()>> = handles.iter().map(|(_, h)| lock(h)).collect();

        let mut outcomes = Vec::new();
        let mut work: Vec<(SeasonData, Vec<AggregateFamily>)> = Vec::new();
        {
            let store = self.store();
            let unique: BTreeSet<Season> = seasons.iter().copied().collect();
            for season in unique {
                let mut pending = Vec::new();
                for &family in families {
                    // Checked again under the key lock; a concurrent build may have landed
                    if !force && store.has_aggregate(family, season)? {
                        debug!(%family, %season, "aggregate already built");
                        outcomes.push(RebuildOutcome {
                            family,
                            season,
                            status: RebuildStatus::Skipped,
                        });
                    } else {
                        pending.push(family);
                    }
                }
                if pending.is_empty() {
                    continue;
                }

                let data = store.load_season(season)?;
                if data.is_empty() {
                    outcomes.extend(pending.into_iter().map(|family| RebuildOutcome {
                        family,
                        season,
                        status: RebuildStatus::NoSourceData,
                    }));
                } else {
                    work.push((data, pending));
                }
            }
        }

        if work.is_empty() {
            if let Some(first) = outcomes.first() {
                if outcomes
                    .iter()
                    .all(|o| o.status == RebuildStatus::NoSourceData)
                {
                    return Err(AnalyticsError::NoSourceData {
                        season: first.season.as_u16(),
                    });
                }
            }
        }

        let built: Vec<(Season, Vec<Built>)> = work
            .par_iter()
            .map(|(data, pending)| {
                let frame = SeasonFrame::build(data);
                let aggregates = pending
                    .iter()
                    .map(|&family| Built::compute(family, &frame))
                    .collect();
                (data.season, aggregates)
            })
            .collect();

        {
            let mut store = self.store();
            for (season, aggregates) in &built {
                for aggregate in aggregates {
                    let family = aggregate.family();
                    let rows = aggregate.rows();
                    aggregate.persist(&mut store, *season)?;
                    self.cache.invalidate(family, *season);
                    info!(%family, %season, rows, "rebuilt aggregate");
                    outcomes.push(RebuildOutcome {
                        family,
                        season: *season,
                        status: RebuildStatus::Rebuilt { rows },
                    });
                }
            }
        }

        outcomes.sort_by_key(|o| (o.season, o.family));
        Ok(RebuildReport { outcomes })
    }

    /// Build whichever of `seasons` are missing for `family`, in one parallel pass
    fn ensure_built(&self, family: AggregateFamily, seasons: &[Season]) -> Result<()> {
        let missing: Vec<Season> = {
            let store = self.store();
            let mut missing = Vec::new();
            for &season in seasons {
                if !store.has_aggregate(family, season)? {
                    missing.push(season);
                }
            }
            missing
        };
        if missing.is_empty() {
            return Ok(());
        }
        match self.rebuild_seasons(&[family], &missing, false) {
            Ok(_) | Err(AnalyticsError::NoSourceData { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Memory tier, then the persisted table, then a lazy rebuild.
    /// A season with no source data reads as empty and is not cached.
    fn cached_season<T: Clone>(
        &self,
        family: AggregateFamily,
        season: Season,
        cache: &UnifiedCache<SeasonKey, Arc<Vec<T>>>,
        load: impl Fn(&LeagueStore, Season) -> anyhow::Result<Option<Vec<T>>>,
    ) -> Result<Arc<Vec<T>>> {
        let key = SeasonKey(season);
        if let Some(hit) = cache.get(&key) {
            return Ok(hit);
        }

        let stored = load(&*self.store(), season)?;
        let rows = match stored {
            Some(rows) => rows,
            None => match self.rebuild_seasons(&[family], &[season], false) {
                Ok(_) => load(&*self.store(), season)?.unwrap_or_default(),
                Err(AnalyticsError::NoSourceData { .. }) => return Ok(Arc::new(Vec::new())),
                Err(err) => return Err(err),
            },
        };

        let rows = Arc::new(rows);
        cache.put(key, Arc::clone(&rows));
        Ok(rows)
    }

    fn ownership(&self) -> Result<OwnershipIndex> {
        Ok(OwnershipIndex::build(self.store().team_seasons(None)?))
    }
}
