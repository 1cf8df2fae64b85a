//! Core utilities shared by the engine
//!
//! - `cache`: in-memory aggregate cache and per-key rebuild locks

pub mod cache;

// Re-export commonly used items for convenience
pub use cache::{
    AggregateKey, CacheKey, CacheManager, CacheSettings, KeyedLocks, OpponentMatrixKey, SeasonKey,
    UnifiedCache,
};
