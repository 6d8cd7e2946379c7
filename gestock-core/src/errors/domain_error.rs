//! Domain errors surfaced to the initiating user.
//!
//! A failed operation leaves prior state unchanged; the user may retry.
//! Nothing here is fatal to the process.

use super::error_code::{self, GestockErrorCode};
use super::storage_error::StorageError;

/// Errors returned by the guard, ledger, lifecycle, and registry operations.
#[derive(Debug, thiserror::Error)]
pub enum GestockError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Demande {id} already decided ({statut})")]
    InvalidState { id: i64, statut: String },

    #[error("Insufficient stock for {key}: {available} available, {requested} requested")]
    InsufficientStock {
        key: String,
        available: i64,
        requested: i64,
    },

    #[error("Ambiguous produit key {key}: {matches} records share it")]
    DuplicateMatch { key: String, matches: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl GestockError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

impl GestockErrorCode for GestockError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => error_code::VALIDATION_ERROR,
            Self::Permission(_) => error_code::PERMISSION_DENIED,
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::InvalidState { .. } => error_code::INVALID_STATE,
            Self::InsufficientStock { .. } => error_code::INSUFFICIENT_STOCK,
            Self::DuplicateMatch { .. } => error_code::DUPLICATE_MATCH,
            Self::Config(_) => error_code::CONFIG_ERROR,
            Self::Storage(e) => e.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            GestockError::validation("bad").error_code(),
            error_code::VALIDATION_ERROR
        );
        assert_eq!(
            GestockError::not_found("produit", "HP/X1").error_code(),
            error_code::NOT_FOUND
        );
        let storage = GestockError::Storage(StorageError::MigrationFailed {
            version: 1,
            message: "boom".to_string(),
        });
        assert_eq!(storage.error_code(), error_code::MIGRATION_FAILED);
    }
}
