//! Storage-layer errors for SQLite operations.

use super::error_code::{self, GestockErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Store locked: {message} (operation: {operation})")]
    Locked { operation: String, message: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl GestockErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::Locked { .. } => error_code::STORE_LOCKED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
