//! Shared error types for the Persona system.

use thiserror::Error;

/// Top-level error type for the Persona system.
#[derive(Error, Debug)]
pub enum PersonaError {
    /// A required field was missing or malformed at the boundary.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The embedding provider failed or returned a malformed vector.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// The record store was unreachable or rejected the operation.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersonaError {
    /// Stable machine-readable name for this error, used in failure results.
    pub fn kind(&self) -> &'static str {
        match self {
            PersonaError::Validation(_) => "validation_failure",
            PersonaError::Embedding(_) => "embedding_failure",
            PersonaError::Persistence(_) => "persistence_failure",
            PersonaError::Config(_) => "config_error",
            PersonaError::Serialization(_) => "serialization_error",
            PersonaError::Internal(_) => "internal_error",
        }
    }

    /// The error message without the kind prefix.
    pub fn details(&self) -> &str {
        match self {
            PersonaError::Validation(m)
            | PersonaError::Embedding(m)
            | PersonaError::Persistence(m)
            | PersonaError::Config(m)
            | PersonaError::Serialization(m)
            | PersonaError::Internal(m) => m,
        }
    }
}

/// Alias for Result with PersonaError.
pub type PersonaResult<T> = Result<T, PersonaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_are_stable() {
        assert_eq!(
            PersonaError::Validation("x".into()).kind(),
            "validation_failure"
        );
        assert_eq!(PersonaError::Embedding("x".into()).kind(), "embedding_failure");
        assert_eq!(
            PersonaError::Persistence("x".into()).kind(),
            "persistence_failure"
        );
    }

    #[test]
    fn test_details_strip_prefix() {
        let err = PersonaError::Persistence("disk full".into());
        assert_eq!(err.details(), "disk full");
        assert_eq!(err.to_string(), "Persistence failed: disk full");
    }
}
