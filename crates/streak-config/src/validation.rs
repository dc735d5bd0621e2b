//! Configuration validation

use crate::schema::RawConfig;
use chrono::NaiveDate;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("tracker.start_date is required")]
    MissingStartDate,

    #[error("Invalid start date '{value}': {message}")]
    InvalidStartDate { value: String, message: String },

    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match &config.tracker.start_date {
        None => errors.push(ValidationError::MissingStartDate),
        Some(value) => {
            if let Err(message) = parse_start_date(value) {
                errors.push(ValidationError::InvalidStartDate {
                    value: value.clone(),
                    message,
                });
            }
        }
    }

    if config.cache.snapshot_ttl_seconds == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "cache.snapshot_ttl_seconds",
        });
    }

    if config.cache.calendar_capacity == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "cache.calendar_capacity",
        });
    }

    if config.cache.store_timeout_ms == Some(0) {
        errors.push(ValidationError::ZeroValue {
            field: "cache.store_timeout_ms",
        });
    }

    errors
}

/// Parse the YYYY-MM-DD start date
pub fn parse_start_date(s: &str) -> Result<NaiveDate, String> {
    streak_util::parse_iso_date(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawCacheConfig, RawTrackerConfig};

    fn config_with(start_date: Option<&str>, cache: RawCacheConfig) -> RawConfig {
        RawConfig {
            config_version: 1,
            tracker: RawTrackerConfig {
                start_date: start_date.map(str::to_string),
            },
            cache,
            service: Default::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = config_with(Some("2025-08-26"), RawCacheConfig::default());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn test_missing_start_date() {
        let config = config_with(None, RawCacheConfig::default());
        let errors = validate_config(&config);
        assert!(matches!(errors.as_slice(), [ValidationError::MissingStartDate]));
    }

    #[test]
    fn test_invalid_start_date() {
        let config = config_with(Some("2025-02-30"), RawCacheConfig::default());
        let errors = validate_config(&config);
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidStartDate { value, .. }] if value == "2025-02-30"
        ));
    }

    #[test]
    fn test_zero_values_all_reported() {
        let config = config_with(
            Some("2025-08-26"),
            RawCacheConfig {
                snapshot_ttl_seconds: Some(0),
                calendar_capacity: Some(0),
                store_timeout_ms: Some(0),
            },
        );

        let errors = validate_config(&config);
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| matches!(e, ValidationError::ZeroValue { .. })));
    }
}
