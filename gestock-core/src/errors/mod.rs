//! Error types for the Gestock workspace.

pub mod domain_error;
pub mod error_code;
pub mod storage_error;

pub use domain_error::GestockError;
pub use storage_error::StorageError;
