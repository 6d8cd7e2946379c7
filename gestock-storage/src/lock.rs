//! Advisory store lock via fd-lock.
//!
//! The record store assumes a single writer process. The exclusive lock turns
//! a second process into an immediate, visible error instead of silent lost
//! updates.

use std::fs::File;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;

use gestock_core::errors::StorageError;

/// Advisory file lock on the data directory, at `<data_dir>/gestock.lock`.
pub struct StoreLock {
    lock_file: RwLock<File>,
    lock_path: PathBuf,
}

impl StoreLock {
    /// Create the lock file. Does not acquire anything yet.
    pub fn new(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;
        let lock_path = data_dir.join("gestock.lock");
        let file = File::create(&lock_path).map_err(|e| StorageError::Io {
            message: e.to_string(),
        })?;
        Ok(Self {
            lock_file: RwLock::new(file),
            lock_path,
        })
    }

    /// Acquire the exclusive lock for the lifetime of this value
    /// (non-blocking). The guard is intentionally leaked; the OS releases the
    /// lock when the file handle closes.
    pub fn hold_exclusive(&mut self) -> Result<(), StorageError> {
        let guard = self.lock_file.try_write().map_err(|_| StorageError::Locked {
            operation: "open".to_string(),
            message: "another gestock process holds the store".to_string(),
        })?;
        std::mem::forget(guard);
        Ok(())
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_holder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = StoreLock::new(dir.path()).unwrap();
        first.hold_exclusive().unwrap();

        let mut second = StoreLock::new(dir.path()).unwrap();
        let err = second.hold_exclusive().unwrap_err();
        assert!(matches!(err, StorageError::Locked { .. }));

        // Releasing the first handle frees the lock.
        drop(first);
        let mut third = StoreLock::new(dir.path()).unwrap();
        third.hold_exclusive().unwrap();
    }
}
