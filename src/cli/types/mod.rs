//! Type-safe wrappers and enums for league analytics data.

pub mod category;
pub mod ids;
pub mod selectors;
pub mod time;

pub use category::{Category, CategoryMap};
pub use ids::{OwnerCode, TeamId};
pub use selectors::{AwardMode, AwardScopeKind, RebuildKind};
pub use time::{Season, Week};
