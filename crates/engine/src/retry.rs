// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two retry operations carried over from the original (§1b, §4.4): the exponential
//! backoff ladder (`retry_failed_entries`) and the blunt immediate reset (`retry_failed`).

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowkeep_core::EntryStatus;
use flowkeep_store::{read_json, with_lock, write_json, EntriesDocument};
use serde::Serialize;

use crate::error::EngineError;

/// Outcome of one `retry_failed_entries` pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetryLadderOutcome {
    pub requeued: Vec<String>,
    pub skipped: Vec<String>,
    pub permanently_failed: Vec<String>,
}

/// Exponential-backoff retry ladder (§4.4): entries at or past their retry budget are promoted
/// to `permanently_failed`; entries still waiting on `next_retry` are left alone; everything
/// else is requeued with its `next_retry` pushed out by `base * 3^retry_count`.
pub fn retry_failed_entries(
    path: &Path,
    max_retries: u32,
    base: Duration,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Result<RetryLadderOutcome, EngineError> {
    let now_iso = now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    with_lock(path, lock_timeout, || {
        let mut doc: EntriesDocument = read_json(path)?;
        let mut outcome = RetryLadderOutcome::default();

        for (key, entry) in doc.entries.iter_mut() {
            if !entry.status.is_retryable() {
                continue;
            }
            let retry_count = entry.retry_count.unwrap_or(0);

            if retry_count >= max_retries {
                entry.status = EntryStatus::PermanentlyFailed;
                entry.status_changed_at = Some(now_iso.clone());
                entry.updated_at = Some(now_iso.clone());
                outcome.permanently_failed.push(key.clone());
                continue;
            }

            if let Some(next_retry) = entry.next_retry.as_deref().and_then(flowkeep_core::parse_timestamp) {
                if now < next_retry {
                    outcome.skipped.push(key.clone());
                    continue;
                }
            }

            let new_count = retry_count + 1;
            let delay_secs = base.as_secs().saturating_mul(3u64.saturating_pow(retry_count));
            let next_retry = now + chrono::Duration::seconds(delay_secs as i64);

            entry.previous_error = entry.error.take();
            entry.retry_count = Some(new_count);
            entry.last_retry = Some(now_iso.clone());
            entry.next_retry = Some(next_retry.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
            entry.status = EntryStatus::Queued;
            entry.status_changed_at = Some(now_iso.clone());
            entry.updated_at = Some(now_iso.clone());
            outcome.requeued.push(key.clone());
        }

        write_json(path, &doc)?;
        Ok(outcome)
    })
    .map_err(EngineError::from)
}

/// Blunt immediate reset (§1b): every `failed` entry goes straight back to `queued`, clearing
/// `error` and ignoring retry-count bookkeeping entirely. `timeout_failed`/`permanently_failed`
/// entries are untouched -- this is the "just try it again now" operation, not the backoff
/// ladder.
pub fn retry_failed(path: &Path, now: DateTime<Utc>, lock_timeout: Duration) -> Result<Vec<String>, EngineError> {
    let now_iso = now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    with_lock(path, lock_timeout, || {
        let mut doc: EntriesDocument = read_json(path)?;
        let mut reset = Vec::new();
        for (key, entry) in doc.entries.iter_mut() {
            if entry.status != EntryStatus::Failed {
                continue;
            }
            entry.status = EntryStatus::Queued;
            entry.status_changed_at = Some(now_iso.clone());
            entry.updated_at = Some(now_iso.clone());
            entry.error = None;
            reset.push(key.clone());
        }
        write_json(path, &doc)?;
        Ok(reset)
    })
    .map_err(EngineError::from)
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
