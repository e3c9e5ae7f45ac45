// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry-file read/write and the `update_entry_status` convenience primitive (§4.2).

use std::path::Path;
use std::time::Duration;

use flowkeep_core::{EntriesDocument, EntryStatus};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::json_file::{read_json, with_lock, write_json};

/// Read an entries file (empty document if absent).
pub fn read_entries(path: &Path) -> Result<EntriesDocument, StoreError> {
    read_json(path)
}

/// Overwrite an entries file in full.
pub fn write_entries(path: &Path, doc: &EntriesDocument) -> Result<(), StoreError> {
    write_json(path, doc)
}

/// Atomically: lock `path`, re-read the entry at `key`, and if present update its `status`,
/// `updated_at`, `status_changed_at` (only if the status actually changed), and merge `extra`
/// fields on top. Returns `false` (without writing) if the entry is missing.
pub fn update_entry_status(
    path: &Path,
    key: &str,
    new_status: EntryStatus,
    extra: Map<String, Value>,
    now_iso: &str,
    lock_timeout: Duration,
) -> Result<bool, StoreError> {
    with_lock(path, lock_timeout, || {
        let mut doc: EntriesDocument = read_json(path)?;
        let Some(entry) = doc.entries.get_mut(key) else {
            return Ok(false);
        };

        let status_changed = entry.status != new_status;
        let mut value = serde_json::to_value(&*entry).unwrap_or(Value::Object(entry.extra.clone()));
        if let Value::Object(obj) = &mut value {
            obj.insert("status".to_string(), serde_json::to_value(new_status).unwrap_or(Value::Null));
            obj.insert("updated_at".to_string(), Value::String(now_iso.to_string()));
            if status_changed {
                obj.insert(
                    "status_changed_at".to_string(),
                    Value::String(now_iso.to_string()),
                );
            }
            for (k, v) in extra {
                obj.insert(k, v);
            }
        }
        *entry = serde_json::from_value(value).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        write_json(path, &doc)?;
        Ok(true)
    })
}

#[cfg(test)]
#[path = "entries_tests.rs"]
mod tests;
