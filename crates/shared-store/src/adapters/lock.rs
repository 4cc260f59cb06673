//! # File Lock Implementation
//!
//! Uses `fs2` for cross-platform file locking (flock on Unix, LockFile on Windows).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

/// Errors from store locking
#[derive(Debug, Error)]
pub enum LockError {
    /// Lock file could not be created
    #[error("Failed to create lock file: {0}")]
    CreateFailed(#[source] io::Error),
    /// Store is already locked by another process
    #[error("Store already in use by process {pid:?} ({})", .path.display())]
    AlreadyLocked { pid: Option<u32>, path: PathBuf },
    /// Failed to write PID to lock file
    #[error("Failed to write PID to lock file: {0}")]
    WriteFailed(#[source] io::Error),
}

/// Exclusive lock next to a store file.
///
/// Acquired when the store is opened, released on drop (RAII). Guarantees a
/// single writing process per data file.
///
/// # Example
///
/// ```ignore
/// let lock = DatabaseLock::acquire(Path::new("/var/lib/campus/core.db"))?;
/// // Lock is held until `lock` goes out of scope
/// ```
#[derive(Debug)]
pub struct DatabaseLock {
    /// The lock file handle (kept open to maintain lock)
    file: File,
    /// Path to the lock file
    path: PathBuf,
    /// PID of this process
    pid: u32,
}

impl DatabaseLock {
    /// Acquire an exclusive lock for `store_path` (lock file `{store_path}.lock`).
    ///
    /// Does not wait: a held lock fails immediately with `AlreadyLocked`.
    pub fn acquire(store_path: &Path) -> Result<Self, LockError> {
        let lock_path = Self::lock_path_for(store_path);

        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(LockError::CreateFailed)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(LockError::CreateFailed)?;

        if file.try_lock_exclusive().is_err() {
            return Err(LockError::AlreadyLocked {
                pid: Self::read_existing_pid(&lock_path),
                path: lock_path,
            });
        }

        let pid = std::process::id();
        let mut locked_file = file;
        locked_file.set_len(0).map_err(LockError::WriteFailed)?;
        writeln!(locked_file, "{}", pid).map_err(LockError::WriteFailed)?;
        locked_file.sync_all().map_err(LockError::WriteFailed)?;

        Ok(Self {
            file: locked_file,
            path: lock_path,
            pid,
        })
    }

    /// Path of the lock file guarding `store_path`.
    pub fn lock_path_for(store_path: &Path) -> PathBuf {
        let mut name = store_path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Get the PID of the process holding the lock
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Get the path to the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read PID from existing lock file (for error messages)
    fn read_existing_pid(path: &Path) -> Option<u32> {
        std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Drop for DatabaseLock {
    fn drop(&mut self) {
        #[allow(clippy::incompatible_msrv)]
        let _ = FileExt::unlock(&self.file);
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_acquire_and_release() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("core.db");

        let lock = DatabaseLock::acquire(&store).unwrap();
        assert_eq!(lock.pid(), std::process::id());
        assert!(lock.path().exists());

        drop(lock);
        assert!(!DatabaseLock::lock_path_for(&store).exists());
    }

    #[test]
    fn test_second_lock_fails() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("core.db");

        let _lock = DatabaseLock::acquire(&store).unwrap();
        let second = DatabaseLock::acquire(&store);
        assert!(matches!(second, Err(LockError::AlreadyLocked { .. })));
    }
}
