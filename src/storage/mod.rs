//! Storage layer for league analytics
//!
//! A thin abstraction over the SQLite database, organized into:
//! - `models`: source-data structures
//! - `schema`: connection and schema management
//! - `queries`: source-data reads and writes
//! - `aggregates`: materialized per-season aggregate tables

pub mod aggregates;
pub mod models;
pub mod queries;
pub mod schema;


pub use aggregates::{AggregateBuild, AggregateFamily};
pub use models::*;
pub use queries::ImportSummary;
pub use schema::LeagueStore;
