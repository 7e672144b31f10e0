//! Error types for storage operations

use thiserror::Error;

use crate::models::ValidationError;

/// Error type for storage operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backing store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query error
    #[error("Query error: {0}")]
    Query(String),

    /// Data not found
    #[error("{0}")]
    NotFound(String),

    /// The two personas have no relationship
    #[error("No relationship found between {persona1_id} and {persona2_id}")]
    RelationshipNotFound {
        persona1_id: String,
        persona2_id: String,
    },

    /// Item already exists
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl StorageError {
    /// Whether the error may mean the store itself is gone, as opposed to a
    /// problem with the request.
    pub fn may_indicate_outage(&self) -> bool {
        matches!(self, StorageError::Connection(_) | StorageError::Query(_))
    }

    pub fn relationship_not_found(a: &str, b: &str) -> Self {
        StorageError::RelationshipNotFound {
            persona1_id: a.to_string(),
            persona2_id: b.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<ValidationError> for StorageError {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_not_found_message() {
        let err = StorageError::relationship_not_found("lila", "nova");
        assert_eq!(err.to_string(), "No relationship found between lila and nova");
        assert!(!err.may_indicate_outage());
    }

    #[test]
    fn validation_converts() {
        let err: StorageError = ValidationError::new("persona_id is required").into();
        assert_eq!(err, StorageError::Validation("persona_id is required".into()));
    }

    #[test]
    fn display_messages() {
        let err: Box<dyn std::error::Error> =
            Box::new(StorageError::Connection("refused".into()));
        assert_eq!(err.to_string(), "Connection error: refused");
        assert_eq!(
            StorageError::NotFound("Persona ghost not found".into()).to_string(),
            "Persona ghost not found"
        );
        assert_eq!(
            StorageError::Validation("trust_delta must be a finite number".into()).to_string(),
            "Validation error: trust_delta must be a finite number"
        );
    }
}
