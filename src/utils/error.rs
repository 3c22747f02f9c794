//! Error handling for the monitoring core
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for the monitoring core
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Main error type for the monitoring core
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Health collection failed entirely (all probe sources unavailable)
    #[error("Collection failed: {0}")]
    CollectionFailed(String),

    /// A required field was missing or invalid on a write operation
    #[error("Invalid field `{field}`: {reason}")]
    InvalidField {
        /// Name of the offending field
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The referenced alert/config/incident does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The persistence collaborator failed; retryable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Notification delivery errors (logged, never propagated past the engine)
    #[error("Notification error: {0}")]
    Notification(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Build an `InvalidField` error naming the rejected field
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a `NotFound` error naming the missing entity and id
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound(format!("{} `{}` does not exist", entity, id))
    }

    /// Whether the caller can usefully retry the operation unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_names_the_field() {
        let err = MonitorError::invalid_field("metric_name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid field `metric_name`: must not be empty"
        );
    }

    #[test]
    fn test_not_found_names_the_id() {
        let err = MonitorError::not_found("alert", "abc-123");
        assert!(err.to_string().contains("abc-123"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_store_unavailable_is_retryable() {
        let err = MonitorError::StoreUnavailable("connection refused".to_string());
        assert!(err.is_retryable());
    }
}
