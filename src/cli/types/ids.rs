//! ID types for fantasy teams and their owners.

use crate::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for provider team ids.
///
/// Team ids are only unique within a season; the same id may belong to a
/// different franchise in another season. Cross-season questions resolve
/// through [`crate::analytics::owners::OwnershipIndex`].
///
/// # Examples
///
/// ```rust
/// use league_analytics::TeamId;
///
/// let team = TeamId::new(7);
/// assert_eq!(team.as_u32(), 7);
/// assert_eq!(team.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u32);

impl TeamId {
    /// Id used by the synthetic league-average row.
    pub const LEAGUE_AVERAGE: TeamId = TeamId(0);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn is_league_average(&self) -> bool {
        *self == Self::LEAGUE_AVERAGE
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Short owner label, stable across seasons (e.g. `MATTEO`).
///
/// Codes are compared case-insensitively by normalising to upper case on
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct OwnerCode(String);

impl From<String> for OwnerCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl OwnerCode {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OwnerCode {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self::new(s))
    }
}
