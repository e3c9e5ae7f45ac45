// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution history append (with 30-day retention trim) and the filtered/sorted/limited
//! query behind `get_execution_history` (§1b).

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowkeep_core::parse_timestamp;

use crate::docs::{ExecutionHistoryDocument, HistoryRecord};
use crate::error::StoreError;
use crate::json_file::{read_json, with_lock, write_json};

const RETENTION: Duration = Duration::from_secs(30 * 24 * 3_600);
const DEFAULT_LIMIT: usize = 100;

/// Append one record, trimming anything older than 30 days relative to `now` in the same
/// locked write.
pub fn append_history(path: &Path, record: HistoryRecord, now: DateTime<Utc>) -> Result<(), StoreError> {
    with_lock(path, Duration::from_secs(30), || {
        let mut doc: ExecutionHistoryDocument = read_json(path)?;
        doc.history.push(record);
        retain_within_retention(&mut doc, now);
        write_json(path, &doc)
    })
}

fn retain_within_retention(doc: &mut ExecutionHistoryDocument, now: DateTime<Utc>) {
    doc.history.retain(|record| match parse_timestamp(&record.timestamp) {
        Some(when) => now.signed_duration_since(when) <= chrono::Duration::seconds(RETENTION.as_secs() as i64),
        None => true,
    });
}

/// Filter parameters for [`query_history`]. `limit` defaults to 100 when `None`.
#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub rule_id: Option<String>,
    pub since: Option<String>,
    pub status: Option<String>,
    pub limit: Option<usize>,
}

/// Result of [`query_history`]: the page of matching records plus the counts `get_execution_history`
/// reports (`total_count` before the limit is applied, `returned_count` after).
#[derive(Debug, Clone)]
pub struct HistoryQueryResult {
    pub records: Vec<HistoryRecord>,
    pub total_count: usize,
    pub returned_count: usize,
}

/// Read `path`, apply `query`'s filters, sort most-recent-first, and cap to its limit.
pub fn query_history(path: &Path, query: &HistoryQuery) -> Result<HistoryQueryResult, StoreError> {
    let doc: ExecutionHistoryDocument = read_json(path)?;
    let since = query.since.as_deref().and_then(parse_timestamp);

    let mut matched: Vec<HistoryRecord> = doc
        .history
        .into_iter()
        .filter(|r| query.rule_id.as_deref().map_or(true, |id| r.rule_id == id))
        .filter(|r| query.status.as_deref().map_or(true, |s| r.result == s))
        .filter(|r| match (since, parse_timestamp(&r.timestamp)) {
            (Some(since), Some(ts)) => ts >= since,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .collect();

    matched.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let total_count = matched.len();

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    matched.truncate(limit);
    let returned_count = matched.len();

    Ok(HistoryQueryResult {
        records: matched,
        total_count,
        returned_count,
    })
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
