//! # gestock-storage
//!
//! SQLite persistence layer for the Gestock service.
//! WAL mode, single write connection, advisory directory lock,
//! PRAGMA user_version migrations.

pub mod connection;
pub mod engine;
pub mod lock;
pub mod migrations;
pub mod queries;

pub use connection::DatabaseManager;
pub use engine::StorageEngine;
pub use lock::StoreLock;
