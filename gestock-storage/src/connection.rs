//! `DatabaseManager` — owns the SQLite connection and applies pragmas.
//!
//! All reads go through `with_reader()`, all writes through `with_writer()`,
//! multi-statement writes through `with_transaction()`. The service assumes a
//! single writer process (see `StoreLock`), so one connection behind a mutex
//! is sufficient; SQLite serializes the rest.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;

use gestock_core::errors::StorageError;

use crate::migrations;

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

pub(crate) fn sqe(e: impl std::fmt::Display) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

fn poisoned(operation: &str) -> StorageError {
    StorageError::Locked {
        operation: operation.to_string(),
        message: "connection mutex poisoned".to_string(),
    }
}

/// Owns the database connection for one gestock.db.
pub struct DatabaseManager {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl DatabaseManager {
    /// Open a file-backed database, applying pragmas and migrations.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open with an explicit busy timeout (from configuration).
    pub fn open_with_timeout(path: &Path, busy_timeout_ms: u64) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path).map_err(sqe)?;
        Self::configure(&conn, busy_timeout_ms)?;
        migrations::initialize(&conn)?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(sqe)?;
        Self::configure(&conn, DEFAULT_BUSY_TIMEOUT_MS)?;
        migrations::initialize(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    fn configure(conn: &Connection, busy_timeout_ms: u64) -> Result<(), StorageError> {
        // journal_mode returns the resulting mode as a row, hence query_row.
        conn.query_row("PRAGMA journal_mode = WAL", [], |_row| Ok(()))
            .map_err(sqe)?;
        conn.pragma_update(None, "synchronous", "NORMAL").map_err(sqe)?;
        conn.pragma_update(None, "foreign_keys", "ON").map_err(sqe)?;
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))
            .map_err(sqe)?;
        Ok(())
    }

    /// Database file path (None for in-memory).
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read-only closure against the connection.
    pub fn with_reader<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.conn.lock().map_err(|_| poisoned("read"))?;
        f(&conn)
    }

    /// Run a write closure against the connection.
    pub fn with_writer<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let conn = self.conn.lock().map_err(|_| poisoned("write"))?;
        f(&conn)
    }

    /// Run a closure inside one transaction. Commits on `Ok`, rolls back on
    /// `Err`.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> Result<T, StorageError>,
    {
        let mut conn = self.conn.lock().map_err(|_| poisoned("transaction"))?;
        let tx = conn.transaction().map_err(sqe)?;
        let out = f(&tx)?;
        tx.commit().map_err(sqe)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_runs_migrations() {
        let db = DatabaseManager::open_in_memory().unwrap();
        let count: i64 = db
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM produits", [], |row| row.get(0))
                    .map_err(sqe)
            })
            .unwrap();
        assert_eq!(count, 0);
        assert!(db.path().is_none());
    }

    #[test]
    fn transaction_rolls_back_on_error() {
        let db = DatabaseManager::open_in_memory().unwrap();
        let result: Result<(), StorageError> = db.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO produits (type_produit, marque, modele, quantite) \
                 VALUES ('ORDINATEUR', 'HP', 'X1', 1)",
                [],
            )
            .map_err(sqe)?;
            Err(StorageError::SqliteError {
                message: "forced".to_string(),
            })
        });
        assert!(result.is_err());

        let count: i64 = db
            .with_reader(|conn| {
                conn.query_row("SELECT COUNT(*) FROM produits", [], |row| row.get(0))
                    .map_err(sqe)
            })
            .unwrap();
        assert_eq!(count, 0);
    }
}
