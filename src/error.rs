//! Error types for the league analytics engine

use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, AnalyticsError>;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("System time error: {0}")]
    SystemTime(#[from] std::time::SystemTimeError),

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Cache error: {message}")]
    Cache { message: String },

    #[error("Invalid year range: {min}..={max}")]
    InvalidYearRange { min: u16, max: u16 },

    #[error("Unknown award id: {id}")]
    InvalidAward { id: String },

    #[error("Unknown category: {name}")]
    InvalidCategory { name: String },

    #[error("Awards scope '{scope}' does not support mode '{mode}'")]
    UnsupportedAwardMode { scope: String, mode: String },

    #[error("No source data for season {season}")]
    NoSourceData { season: u16 },
}

impl AnalyticsError {
    /// Validation errors are the caller's fault and map to 4xx-style responses.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidYearRange { .. }
                | AnalyticsError::InvalidAward { .. }
                | AnalyticsError::InvalidCategory { .. }
                | AnalyticsError::UnsupportedAwardMode { .. }
                | AnalyticsError::InvalidNumber(_)
        )
    }
}

impl From<anyhow::Error> for AnalyticsError {
    fn from(err: anyhow::Error) -> Self {
        // Keep typed rusqlite errors typed when the storage layer passed one through.
        match err.downcast::<rusqlite::Error>() {
            Ok(db) => AnalyticsError::Database(db),
            Err(other) => AnalyticsError::Storage {
                message: format!("{:#}", other),
            },
        }
    }
}
