//! Unit tests for error handling

use super::*;
use std::io;

#[cfg(test)]
mod analytics_error_tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = AnalyticsError::from(json_error);

        match error {
            AnalyticsError::Json(_) => (),
            _ => panic!("Expected Json error variant"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = AnalyticsError::from(io_error);

        match error {
            AnalyticsError::Io(_) => (),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_parse_int_error_conversion() {
        let parse_error = "not_a_number".parse::<u16>().unwrap_err();
        let error = AnalyticsError::from(parse_error);

        match error {
            AnalyticsError::InvalidNumber(_) => (),
            _ => panic!("Expected InvalidNumber error variant"),
        }
        assert!(AnalyticsError::from("x".parse::<u16>().unwrap_err()).is_validation());
    }

    #[test]
    fn test_database_error_conversion() {
        let db_error = rusqlite::Error::InvalidColumnType(
            0,
            "test_column".to_string(),
            rusqlite::types::Type::Null,
        );
        let error = AnalyticsError::from(db_error);

        match error {
            AnalyticsError::Database(_) => (),
            _ => panic!("Expected Database error variant"),
        }
    }

    #[test]
    fn test_anyhow_wrapping_rusqlite_stays_typed() {
        let wrapped = anyhow::Error::from(rusqlite::Error::QueryReturnedNoRows);
        match AnalyticsError::from(wrapped) {
            AnalyticsError::Database(rusqlite::Error::QueryReturnedNoRows) => (),
            other => panic!("Expected Database error variant, got {:?}", other),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let anyhow_error = anyhow::anyhow!("Test anyhow error message");
        let error = AnalyticsError::from(anyhow_error);

        match error {
            AnalyticsError::Storage { message } => {
                assert!(message.contains("Test anyhow error message"));
            }
            _ => panic!("Expected Storage error variant"),
        }
    }

    #[test]
    fn test_system_time_error_conversion() {
        use std::time::{Duration, SystemTime, UNIX_EPOCH};

        let future_time = SystemTime::now() + Duration::from_secs(100);
        let system_time_error = UNIX_EPOCH.duration_since(future_time).unwrap_err();
        let error = AnalyticsError::from(system_time_error);

        match error {
            AnalyticsError::SystemTime(_) => (),
            _ => panic!("Expected SystemTime error variant"),
        }
    }

    #[test]
    fn test_invalid_year_range_message() {
        let error = AnalyticsError::InvalidYearRange {
            min: 2025,
            max: 2020,
        };
        assert_eq!(error.to_string(), "Invalid year range: 2025..=2020");
        assert!(error.is_validation());
    }

    #[test]
    fn test_invalid_award_message() {
        let error = AnalyticsError::InvalidAward {
            id: "best_vibes".to_string(),
        };
        assert!(error.to_string().contains("best_vibes"));
        assert!(error.is_validation());
    }

    #[test]
    fn test_unsupported_mode_message() {
        let error = AnalyticsError::UnsupportedAwardMode {
            scope: "league".to_string(),
            mode: "year_by_year".to_string(),
        };
        let s = error.to_string();
        assert!(s.contains("league"));
        assert!(s.contains("year_by_year"));
        assert!(error.is_validation());
    }

    #[test]
    fn test_no_source_data_is_not_validation() {
        let error = AnalyticsError::NoSourceData { season: 2024 };
        assert_eq!(error.to_string(), "No source data for season 2024");
        assert!(!error.is_validation());
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = AnalyticsError::from(io_error);

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_result_type_alias_error() {
        fn test_function() -> Result<String> {
            Err(AnalyticsError::NoSourceData { season: 2020 })
        }

        match test_function().unwrap_err() {
            AnalyticsError::NoSourceData { season } => assert_eq!(season, 2020),
            _ => panic!("Expected NoSourceData error"),
        }
    }
}
