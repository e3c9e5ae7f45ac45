// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `process_queue_entry_with_lock` (§4.4): claim an entry under lock, run its rule's action,
//! and settle the entry's terminal status.

use std::path::Path;
use std::time::Duration;

use flowkeep_core::{Entry, EntryStatus};
use flowkeep_store::{read_json, with_lock, write_json, EntriesDocument};
use serde_json::{json, Map, Value};

use crate::actions::{run_action, ActionOutcome};
use crate::invoker::ToolInvoker;

/// Outcome of one `process_queue_entry_with_lock` call, carried back to the caller for
/// ExecutionHistory logging.
pub struct ProcessedEntry {
    pub outcome: ActionOutcome,
}

/// Claim `key` in the entries file at `entries_path` (skipping it if already claimed or
/// terminally handled), run `action` against its context, and settle the resulting status.
/// Returns `None` if the entry could not be claimed (missing, or already
/// processing/processed/failed/timeout_failed).
pub fn process_queue_entry_with_lock(
    entries_path: &Path,
    key: &str,
    action: &flowkeep_core::Action,
    default_timeout: Duration,
    invoker: &dyn ToolInvoker,
    now: &str,
    lock_timeout: Duration,
) -> Result<Option<ProcessedEntry>, flowkeep_store::StoreError> {
    let claimed_context = with_lock(entries_path, lock_timeout, || {
        let mut doc: EntriesDocument = read_json(entries_path)?;
        let Some(entry) = doc.entries.get(key) else {
            return Ok(None);
        };
        if matches!(
            entry.status,
            EntryStatus::Processing | EntryStatus::Processed | EntryStatus::Failed | EntryStatus::TimeoutFailed
        ) {
            return Ok(None);
        }
        let mut context = entry.to_context();
        set_field(&mut context, "entry_key", json!(key));

        let entry = doc.entries.get_mut(key).expect("checked present above");
        entry.status = EntryStatus::Processing;
        entry.updated_at = Some(now.to_string());
        entry.status_changed_at = Some(now.to_string());
        write_json(entries_path, &doc)?;
        Ok(Some(context))
    })?;

    let Some(context) = claimed_context else {
        return Ok(None);
    };

    let outcome = run_action(invoker, action, &context, default_timeout);
    settle(entries_path, key, &outcome, now, lock_timeout)?;
    Ok(Some(ProcessedEntry { outcome }))
}

fn settle(
    entries_path: &Path,
    key: &str,
    outcome: &ActionOutcome,
    now: &str,
    lock_timeout: Duration,
) -> Result<(), flowkeep_store::StoreError> {
    with_lock(entries_path, lock_timeout, || {
        let mut doc: EntriesDocument = read_json(entries_path)?;
        let Some(entry) = doc.entries.get_mut(key) else {
            return Ok(());
        };
        match outcome {
            ActionOutcome::TimeoutFailed { duration } => {
                set_terminal(entry, EntryStatus::TimeoutFailed, now);
                entry.error = Some(format!("timed out after {:.1}s", duration.as_secs_f64()));
            }
            ActionOutcome::Error { message, .. } => {
                set_terminal(entry, EntryStatus::Failed, now);
                entry.error = Some(message.clone());
            }
            ActionOutcome::Completed { .. } => {
                // "trust the action's own status update" (§4.4): only promote to `processed`
                // if the action (or a concurrent writer) left the entry's status untouched.
                if entry.status == EntryStatus::Processing {
                    set_terminal(entry, EntryStatus::Processed, now);
                }
            }
        }
        write_json(entries_path, &doc)
    })
}

fn set_terminal(entry: &mut Entry, status: EntryStatus, now: &str) {
    if entry.status != status {
        entry.status_changed_at = Some(now.to_string());
    }
    entry.status = status;
    entry.updated_at = Some(now.to_string());
}

fn set_field(context: &mut Value, key: &str, value: Value) {
    if !context.is_object() {
        *context = Value::Object(Map::new());
    }
    if let Value::Object(map) = context {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
#[path = "queue_entry_tests.rs"]
mod tests;
