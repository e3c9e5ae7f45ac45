// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed read/write of whole-file JSON documents, and the lock-framed mutation helper every
//! multi-step write in this crate goes through.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Read `path` as a JSON document of type `T`, returning `T::default()` if the file does not
/// exist yet (a document that has never been written is indistinguishable from an empty one).
pub fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    match fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(T::default()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write `value` to `path` as pretty JSON, atomically: serialize to a sibling `.tmp` file,
/// flush, then rename over the target. A reader never observes a half-written document.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let body = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp_path = path.with_extension("tmp");
    {
        let mut tmp = fs::File::create(&tmp_path).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        tmp.write_all(&body).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        tmp.sync_all().map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
    }
    fs::rename(&tmp_path, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Append a single line to a JSON-lines file, creating it if absent.
pub fn append_jsonl<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StoreError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let mut line = serde_json::to_string(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    line.push('\n');
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(line.as_bytes())
        .map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Acquire an exclusive lock rooted at `target`, run `f`, then release the lock -- regardless
/// of whether `f` returned `Ok` or `Err`.
pub fn with_lock<R>(
    target: &Path,
    timeout: Duration,
    f: impl FnOnce() -> Result<R, StoreError>,
) -> Result<R, StoreError> {
    let _handle = flowkeep_lock::acquire(target, timeout)?;
    f()
}

#[cfg(test)]
#[path = "json_file_tests.rs"]
mod tests;
