// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The acquire/release lifecycle of an exclusive advisory lock.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

use crate::POLL_INTERVAL;

/// Errors raised while acquiring a lock.
#[derive(Debug, Error)]
pub enum LockError {
    #[error("timed out acquiring lock on {0} after {1:?}")]
    Timeout(PathBuf, Duration),
    #[error("io error locking {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The path of the `.lock` file shadowing `target`.
pub fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

/// A held exclusive lock. Dropping the handle releases the OS lock and best-effort removes
/// the lockfile; failure to remove is not an error since a racing acquirer may already have
/// replaced it.
pub struct LockHandle {
    path: PathBuf,
    file: Option<File>,
}

impl LockHandle {
    /// The path of the underlying lockfile.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock immediately. Idempotent: calling this, or dropping the handle
    /// afterwards, is safe.
    pub fn release(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
        let _ = std::fs::remove_file(&self.path);
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Acquire an exclusive advisory lock rooted at `<target>.lock`, polling every 100ms until
/// acquired or `timeout` elapses.
///
/// The lockfile is opened with `create + write` and `truncate(false)` *before* the exclusive
/// lock is taken — truncating first would destroy a competitor's in-progress metadata write on
/// contention. Reentrancy is not supported: acquiring twice from the same process deadlocks
/// against itself exactly as it would across processes.
pub fn acquire(target: &Path, timeout: Duration) -> Result<LockHandle, LockError> {
    let lock_path = lock_path_for(target);
    let deadline = Instant::now() + timeout;

    loop {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| LockError::Io {
                path: lock_path.clone(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                return Ok(LockHandle {
                    path: lock_path,
                    file: Some(file),
                });
            }
            Err(ref e) if e.kind() == fs2::lock_contended_error().kind() => {
                if Instant::now() >= deadline {
                    return Err(LockError::Timeout(lock_path, timeout));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                return Err(LockError::Io {
                    path: lock_path,
                    source,
                });
            }
        }
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
