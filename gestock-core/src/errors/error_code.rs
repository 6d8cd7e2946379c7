//! Stable error codes surfaced to callers alongside messages.

/// Maps an error to a stable machine-readable code.
pub trait GestockErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const INVALID_STATE: &str = "INVALID_STATE";
pub const INSUFFICIENT_STOCK: &str = "INSUFFICIENT_STOCK";
pub const DUPLICATE_MATCH: &str = "DUPLICATE_MATCH";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const STORE_LOCKED: &str = "STORE_LOCKED";
