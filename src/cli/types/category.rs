//! Scoring categories of a nine-category head-to-head league.

use crate::error::AnalyticsError;
use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// One of the nine scored statistics.
///
/// Every category is "higher is better"; there is no turnover category in
/// this league format.
///
/// # Examples
///
/// ```rust
/// use league_analytics::Category;
///
/// let pts: Category = "pts".parse().unwrap();
/// assert_eq!(pts, Category::Pts);
/// assert_eq!(pts.to_string(), "PTS");
/// assert_eq!("FG%".parse::<Category>().unwrap().slug(), "fg_pct");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    FgPct,
    FtPct,
    ThreePm,
    Reb,
    Ast,
    Stl,
    Blk,
    Dd,
    Pts,
}

impl Category {
    /// Canonical category order. Sums over categories always run in this order.
    pub const ALL: [Category; 9] = [
        Category::FgPct,
        Category::FtPct,
        Category::ThreePm,
        Category::Reb,
        Category::Ast,
        Category::Stl,
        Category::Blk,
        Category::Dd,
        Category::Pts,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Display label, e.g. `FG%`.
    pub fn label(self) -> &'static str {
        match self {
            Category::FgPct => "FG%",
            Category::FtPct => "FT%",
            Category::ThreePm => "3PM",
            Category::Reb => "REB",
            Category::Ast => "AST",
            Category::Stl => "STL",
            Category::Blk => "BLK",
            Category::Dd => "DD",
            Category::Pts => "PTS",
        }
    }

    /// Identifier-safe form used in award ids and column names.
    pub fn slug(self) -> &'static str {
        match self {
            Category::FgPct => "fg_pct",
            Category::FtPct => "ft_pct",
            Category::ThreePm => "3pm",
            Category::Reb => "reb",
            Category::Ast => "ast",
            Category::Stl => "stl",
            Category::Blk => "blk",
            Category::Dd => "dd",
            Category::Pts => "pts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FG%" | "FG_PCT" | "FG" => Ok(Category::FgPct),
            "FT%" | "FT_PCT" | "FT" => Ok(Category::FtPct),
            "3PM" | "THREE_PM" | "TPM" => Ok(Category::ThreePm),
            "REB" => Ok(Category::Reb),
            "AST" => Ok(Category::Ast),
            "STL" => Ok(Category::Stl),
            "BLK" => Ok(Category::Blk),
            "DD" => Ok(Category::Dd),
            "PTS" => Ok(Category::Pts),
            _ => Err(AnalyticsError::InvalidCategory {
                name: s.to_string(),
            }),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Fixed-size map with exactly one value per [`Category`].
///
/// Serialises as a JSON object keyed by category label (`{"FG%": .., "PTS": ..}`);
/// missing keys deserialise to `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryMap<T>([T; 9]);

impl<T> CategoryMap<T> {
    /// Build a map by evaluating `f` once per category, in canonical order.
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self(std::array::from_fn(|i| f(Category::ALL[i])))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> CategoryMap<U> {
        CategoryMap::from_fn(|cat| f(cat, &self.0[cat.index()]))
    }
}

impl CategoryMap<f64> {
    /// Sum over categories in canonical order.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl<T: Default> Default for CategoryMap<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> Index<Category> for CategoryMap<T> {
    type Output = T;

    fn index(&self, cat: Category) -> &T {
        &self.0[cat.index()]
    }
}

impl<T> IndexMut<Category> for CategoryMap<T> {
    fn index_mut(&mut self, cat: Category) -> &mut T {
        &mut self.0[cat.index()]
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for (cat, value) in self.iter() {
            map.serialize_entry(cat.label(), value)?;
        }
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for CategoryMap<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, T> = BTreeMap::deserialize(deserializer)?;
        let mut out = CategoryMap::<T>::default();
        for (key, value) in raw {
            let cat: Category = key.parse().map_err(de::Error::custom)?;
            out[cat] = value;
        }
        Ok(out)
    }
}
