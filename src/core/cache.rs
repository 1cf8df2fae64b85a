//! In-memory tier of the aggregate cache
//!
//! Two tiers sit in front of every multi-week or multi-year computation:
//! - L1: in-memory LRU caches, one per aggregate family or query shape
//! - L2: the SQLite aggregate tables (see `storage::aggregates`)
//!
//! Values are stored behind `Arc` so a hit is a pointer copy. A rebuild
//! replaces the L2 rows first and then invalidates the matching L1 entries.

use lru::LruCache;
use std::{
    collections::HashMap,
    hash::Hash,
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tracing::debug;

use crate::analytics::{
    awards::{AwardsQuery, AwardsReport},
    history::TeamHistory,
    opponents::{OpponentMatrix, OpponentSeasonRecord},
    power::SeasonPowerRow,
};
use crate::cli::types::{Season, TeamId};
use crate::storage::AggregateFamily;

/// Lock a mutex, recovering the data if another thread panicked while holding it
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Key usable in a [`UnifiedCache`]
pub trait CacheKey: Hash + Eq + Clone + Send + Sync {
    /// Human-readable form used in log lines
    fn to_cache_key(&self) -> String;

    /// Whether this entry depends on data from `season`
    fn covers(&self, season: Season) -> bool;
}

/// One season of one aggregate family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonKey(pub Season);

impl CacheKey for SeasonKey {
    fn to_cache_key(&self) -> String {
        format!("s{}", self.0)
    }

    fn covers(&self, season: Season) -> bool {
        self.0 == season
    }
}

/// A merged opponent-matrix query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpponentMatrixKey {
    pub team_id: TeamId,
    pub min_season: Season,
    pub max_season: Season,
    pub owner_era_only: bool,
}

impl CacheKey for OpponentMatrixKey {
    fn to_cache_key(&self) -> String {
        format!(
            "opponents_t{}_s{}-{}_{}",
            self.team_id,
            self.min_season,
            self.max_season,
            if self.owner_era_only { "era" } else { "all" }
        )
    }

    fn covers(&self, season: Season) -> bool {
        // Owner eras move when any season changes hands
        self.owner_era_only || (self.min_season <= season && season <= self.max_season)
    }
}

/// A validated awards query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AwardsKey(pub AwardsQuery);

impl CacheKey for AwardsKey {
    fn to_cache_key(&self) -> String {
        format!("awards_{:?}", self.0)
    }

    fn covers(&self, _season: Season) -> bool {
        // All-time and era-scoped selections can pull in any season
        true
    }
}

/// Bounded LRU cache shared across threads
pub struct UnifiedCache<K, V>
where
    K: CacheKey,
    V: Clone,
{
    name: &'static str,
    memory_cache: Arc<Mutex<LruCache<K, V>>>,
    memory_capacity: usize,
}

impl<K, V> UnifiedCache<K, V>
where
    K: CacheKey,
    V: Clone,
{
    /// Create a new cache; a zero capacity is treated as one
    pub fn new(name: &'static str, memory_capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(memory_capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            memory_cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            memory_capacity: capacity.get(),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let hit = lock(&self.memory_cache).get(key).cloned();
        debug!(
            cache = self.name,
            key = %key.to_cache_key(),
            hit = hit.is_some(),
            "memory cache lookup"
        );
        hit
    }

    pub fn put(&self, key: K, value: V) {
        lock(&self.memory_cache).put(key, value);
    }

    pub fn invalidate(&self, key: &K) {
        lock(&self.memory_cache).pop(key);
    }

    /// Drop every entry that depends on `season`; returns how many went
    pub fn invalidate_season(&self, season: Season) -> usize {
        let mut cache = lock(&self.memory_cache);
        let stale: Vec<K> = cache
            .iter()
            .filter(|(k, _)| k.covers(season))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            cache.pop(key);
        }
        stale.len()
    }

    pub fn clear_memory(&self) {
        lock(&self.memory_cache).clear();
    }

    /// (entries, capacity)
    pub fn memory_stats(&self) -> (usize, usize) {
        let cache = lock(&self.memory_cache);
        (cache.len(), self.memory_capacity)
    }
}

/// Memory-tier capacities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Seasons kept per aggregate family.
    pub season_capacity: usize,
    /// Merged query results (opponent matrices, awards) kept per kind.
    pub query_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            season_capacity: 32,
            query_capacity: 128,
        }
    }
}

/// All memory caches used by the engine
pub struct CacheManager {
    pub season_power: UnifiedCache<SeasonKey, Arc<Vec<SeasonPowerRow>>>,
    pub team_history: UnifiedCache<SeasonKey, Arc<Vec<TeamHistory>>>,
    pub opponent_records: UnifiedCache<SeasonKey, Arc<Vec<OpponentSeasonRecord>>>,
    pub opponent_matrix: UnifiedCache<OpponentMatrixKey, Arc<OpponentMatrix>>,
    pub awards: UnifiedCache<AwardsKey, Arc<AwardsReport>>,
}

impl CacheManager {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            season_power: UnifiedCache::new("season_power", settings.season_capacity),
            team_history: UnifiedCache::new("team_history", settings.season_capacity),
            opponent_records: UnifiedCache::new("opponent_records", settings.season_capacity),
            opponent_matrix: UnifiedCache::new("opponent_matrix", settings.query_capacity),
            awards: UnifiedCache::new("awards", settings.query_capacity),
        }
    }

    /// Drop a rebuilt (family, season) and every merged result derived from it
    pub fn invalidate(&self, family: AggregateFamily, season: Season) {
        let key = SeasonKey(season);
        let dropped = match family {
            AggregateFamily::SeasonPower => {
                self.season_power.invalidate(&key);
                self.awards.invalidate_season(season)
            }
            AggregateFamily::TeamHistory => {
                self.team_history.invalidate(&key);
                self.awards.invalidate_season(season)
            }
            AggregateFamily::OpponentMatrix => {
                self.opponent_records.invalidate(&key);
                self.opponent_matrix.invalidate_season(season)
            }
        };
        debug!(%family, %season, dependents = dropped, "invalidated memory cache");
    }

    /// Clear all memory caches
    pub fn clear_all_memory(&self) {
        self.season_power.clear_memory();
        self.team_history.clear_memory();
        self.opponent_records.clear_memory();
        self.opponent_matrix.clear_memory();
        self.awards.clear_memory();
    }

    /// Get memory usage statistics for all caches
    pub fn memory_stats(&self) -> HashMap<String, (usize, usize)> {
        let mut stats = HashMap::new();
        stats.insert("season_power".to_string(), self.season_power.memory_stats());
        stats.insert("team_history".to_string(), self.team_history.memory_stats());
        stats.insert(
            "opponent_records".to_string(),
            self.opponent_records.memory_stats(),
        );
        stats.insert(
            "opponent_matrix".to_string(),
            self.opponent_matrix.memory_stats(),
        );
        stats.insert("awards".to_string(), self.awards.memory_stats());
        stats
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

/// One lock target: a single (family, season) aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AggregateKey {
    pub family: AggregateFamily,
    pub season: Season,
}

/// Per-key mutual exclusion for rebuilds
///
/// Two rebuilds of the same key run one after the other; rebuilds of
/// different keys do not block each other.
#[derive(Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<AggregateKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handles for `keys`, sorted and deduplicated so that callers
    /// acquiring them in order can never deadlock against each other
    pub fn handles(&self, keys: &[AggregateKey]) -> Vec<(AggregateKey, Arc<Mutex<()>>)> {
        let mut keys = keys.to_vec();
        keys.sort();
        keys.dedup();

        let mut locks = lock(&self.locks);
        keys.into_iter()
            .map(|key| (key, Arc::clone(locks.entry(key).or_default())))
            .collect()
    }
}

#[cfg(test)]
mod tests;
