//! Unit tests for the memory tier and rebuild locks

use super::*;
use std::thread;

fn matrix_key(min: u16, max: u16, owner_era_only: bool) -> OpponentMatrixKey {
    OpponentMatrixKey {
        team_id: TeamId::new(1),
        min_season: Season::new(min),
        max_season: Season::new(max),
        owner_era_only,
    }
}

#[cfg(test)]
mod unified_cache_tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache: UnifiedCache<SeasonKey, String> = UnifiedCache::new("test", 4);
        assert!(cache.get(&SeasonKey(Season::new(2024))).is_none());

        cache.put(SeasonKey(Season::new(2024)), "rows".to_string());
        assert_eq!(
            cache.get(&SeasonKey(Season::new(2024))),
            Some("rows".to_string())
        );
    }

    #[test]
    fn test_lru_eviction() {
        let cache: UnifiedCache<SeasonKey, u32> = UnifiedCache::new("test", 2);
        cache.put(SeasonKey(Season::new(2022)), 1);
        cache.put(SeasonKey(Season::new(2023)), 2);

        // Touch 2022 so 2023 becomes least recently used
        assert_eq!(cache.get(&SeasonKey(Season::new(2022))), Some(1));
        cache.put(SeasonKey(Season::new(2024)), 3);

        assert_eq!(cache.get(&SeasonKey(Season::new(2023))), None);
        assert_eq!(cache.get(&SeasonKey(Season::new(2022))), Some(1));
        assert_eq!(cache.memory_stats(), (2, 2));
    }

    #[test]
    fn test_zero_capacity_holds_one_entry() {
        let cache: UnifiedCache<SeasonKey, u32> = UnifiedCache::new("test", 0);
        cache.put(SeasonKey(Season::new(2024)), 7);
        assert_eq!(cache.memory_stats(), (1, 1));
    }

    #[test]
    fn test_invalidate_single_key() {
        let cache: UnifiedCache<SeasonKey, u32> = UnifiedCache::new("test", 4);
        cache.put(SeasonKey(Season::new(2023)), 1);
        cache.put(SeasonKey(Season::new(2024)), 2);

        cache.invalidate(&SeasonKey(Season::new(2024)));
        assert!(cache.get(&SeasonKey(Season::new(2024))).is_none());
        assert_eq!(cache.get(&SeasonKey(Season::new(2023))), Some(1));
    }

    #[test]
    fn test_invalidate_season_drops_covering_ranges() {
        let cache: UnifiedCache<OpponentMatrixKey, u32> = UnifiedCache::new("test", 8);
        cache.put(matrix_key(2020, 2022, false), 1);
        cache.put(matrix_key(2023, 2024, false), 2);
        cache.put(matrix_key(2019, 2020, true), 3);

        let dropped = cache.invalidate_season(Season::new(2021));

        // The 2020-2022 range covers 2021 and era queries always go
        assert_eq!(dropped, 2);
        assert_eq!(cache.get(&matrix_key(2023, 2024, false)), Some(2));
        assert!(cache.get(&matrix_key(2020, 2022, false)).is_none());
        assert!(cache.get(&matrix_key(2019, 2020, true)).is_none());
    }

    #[test]
    fn test_clear_memory() {
        let cache: UnifiedCache<SeasonKey, u32> = UnifiedCache::new("test", 4);
        cache.put(SeasonKey(Season::new(2024)), 1);
        cache.clear_memory();
        assert_eq!(cache.memory_stats(), (0, 4));
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(SeasonKey(Season::new(2024)).to_cache_key(), "s2024");
        assert_eq!(
            matrix_key(2020, 2024, true).to_cache_key(),
            "opponents_t1_s2020-2024_era"
        );
    }
}

#[cfg(test)]
mod cache_manager_tests {
    use super::*;

    #[test]
    fn test_manager_uses_settings() {
        let manager = CacheManager::new(CacheSettings {
            season_capacity: 3,
            query_capacity: 5,
        });
        let stats = manager.memory_stats();
        assert_eq!(stats["season_power"], (0, 3));
        assert_eq!(stats["awards"], (0, 5));
        assert_eq!(stats.len(), 5);
    }

    #[test]
    fn test_invalidate_opponent_family_keeps_other_families() {
        let manager = CacheManager::default();
        let season = Season::new(2024);
        manager
            .season_power
            .put(SeasonKey(season), Arc::new(Vec::new()));
        manager
            .opponent_records
            .put(SeasonKey(season), Arc::new(Vec::new()));

        manager.invalidate(AggregateFamily::OpponentMatrix, season);

        assert!(manager.opponent_records.get(&SeasonKey(season)).is_none());
        assert!(manager.season_power.get(&SeasonKey(season)).is_some());
    }

    #[test]
    fn test_clear_all_memory() {
        let manager = CacheManager::default();
        manager
            .team_history
            .put(SeasonKey(Season::new(2024)), Arc::new(Vec::new()));
        manager.clear_all_memory();
        assert!(manager.memory_stats().values().all(|(len, _)| *len == 0));
    }
}

#[cfg(test)]
mod keyed_lock_tests {
    use super::*;

    fn key(family: AggregateFamily, season: u16) -> AggregateKey {
        AggregateKey {
            family,
            season: Season::new(season),
        }
    }

    #[test]
    fn test_handles_sorted_and_deduplicated() {
        let locks = KeyedLocks::new();
        let handles = locks.handles(&[
            key(AggregateFamily::OpponentMatrix, 2024),
            key(AggregateFamily::SeasonPower, 2024),
            key(AggregateFamily::SeasonPower, 2023),
            key(AggregateFamily::SeasonPower, 2024),
        ]);
        let keys: Vec<AggregateKey> = handles.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                key(AggregateFamily::SeasonPower, 2023),
                key(AggregateFamily::SeasonPower, 2024),
                key(AggregateFamily::OpponentMatrix, 2024),
            ]
        );
    }

    #[test]
    fn test_same_key_shares_a_mutex() {
        let locks = KeyedLocks::new();
        let k = key(AggregateFamily::TeamHistory, 2024);
        let first = locks.handles(&[k]);
        let second = locks.handles(&[k]);
        assert!(Arc::ptr_eq(&first[0].1, &second[0].1));

        let other = locks.handles(&[key(AggregateFamily::TeamHistory, 2023)]);
        assert!(!Arc::ptr_eq(&first[0].1, &other[0].1));
    }

    #[test]
    fn test_handle_serialises_same_key() {
        let locks = Arc::new(KeyedLocks::new());
        let counter = Arc::new(Mutex::new(Vec::new()));
        let k = key(AggregateFamily::SeasonPower, 2024);

        let workers: Vec<_> = (0..4)
            .map(|i| {
                let locks = Arc::clone(&locks);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    let handles = locks.handles(&[k]);
                    let _guard = lock(&handles[0].1);
                    counter.lock().unwrap().push(i);
                    counter.lock().unwrap().push(i);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // Each worker's two pushes land next to each other
        let seen = counter.lock().unwrap();
        assert_eq!(seen.len(), 8);
        for pair in seen.chunks(2) {
            assert_eq!(pair[0], pair[1]);
        }
    }
}
