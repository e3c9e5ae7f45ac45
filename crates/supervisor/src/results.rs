// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion logging, the results archive, and the read-side task/result accessors (§4.5).

use std::path::Path;
use std::time::Duration;

use flowkeep_core::{
    extract_request_id, extract_tags, normalize_completion_status, parse_timestamp, Task,
    TaskResult, TaskStatus, TokenUsage,
};
use flowkeep_store::{append_jsonl, read_json, with_lock, write_json, TaskQueueDocument, TaskResultsDocument};
use serde::Serialize;
use serde_json::Value;

use crate::error::SupervisorError;

const MAX_RESULTS: usize = 10;

fn status_label(status: TaskStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// `#tag` mentions double as a (best-effort) category: the first tag found, if any.
fn infer_category(tags: &[String]) -> Option<String> {
    tags.first().cloned()
}

fn execution_time_seconds(task: &Task, now: &str) -> Option<f64> {
    let start = parse_timestamp(task.execution_start())?;
    let end = parse_timestamp(now)?;
    Some(end.signed_duration_since(start).num_milliseconds().max(0) as f64 / 1000.0)
}

/// Finalize a task: remove it from the queue, write a result record (archiving overflow past
/// 10 retained results), extract tags/category, and handle the `REQUEST_ID` and token-sidecar
/// side channels.
#[allow(clippy::too_many_arguments)]
pub fn log_task_completion(
    queue_path: &Path,
    results_path: &Path,
    archive_path: &Path,
    results_dir: &Path,
    tokens_sidecar_path: Option<&Path>,
    task_id: &str,
    raw_status: &str,
    actions_taken: Value,
    output: Value,
    now: &str,
    lock_timeout: Duration,
) -> Result<TaskResult, SupervisorError> {
    let task: Option<Task> = with_lock(queue_path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(queue_path)?;
        let task = doc.tasks.shift_remove(task_id);
        if task.is_some() {
            write_json(queue_path, &doc)?;
        }
        Ok(task)
    })?;
    let task = task.ok_or_else(|| SupervisorError::NotFound(task_id.to_string()))?;

    let tokens = read_and_clear_sidecar(tokens_sidecar_path)?;
    let tags = extract_tags(&task.description);
    let category = infer_category(&tags);

    let record = TaskResult {
        task_id: task_id.to_string(),
        status: normalize_completion_status(raw_status).to_string(),
        actions_taken,
        output,
        completed_at: now.to_string(),
        execution_time_seconds: execution_time_seconds(&task, now),
        project_tags: tags,
        category,
        description: Some(task.description.clone()),
        tokens,
    };

    with_lock(results_path, lock_timeout, || {
        let mut doc: TaskResultsDocument = read_json(results_path)?;
        archive_overflow(&mut doc, archive_path)?;
        doc.results.insert(task_id.to_string(), record.clone());
        write_json(results_path, &doc)
    })?;

    if let Some(request_id) = extract_request_id(&task.description) {
        let path = results_dir.join(format!("{request_id}.json"));
        write_json(&path, &record)?;
    }

    Ok(record)
}

fn read_and_clear_sidecar(path: Option<&Path>) -> Result<Option<TokenUsage>, SupervisorError> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }
    let tokens: TokenUsage = read_json(path)?;
    let _ = std::fs::remove_file(path);
    Ok(Some(tokens))
}

/// Evict the oldest results (by `completed_at`) to the JSON-lines archive until the document
/// holds at most `MAX_RESULTS - 1` entries, leaving room for the record about to be inserted.
fn archive_overflow(doc: &mut TaskResultsDocument, archive_path: &Path) -> Result<(), flowkeep_store::StoreError> {
    while doc.results.len() >= MAX_RESULTS {
        let oldest_id = doc
            .results
            .iter()
            .min_by(|a, b| a.1.completed_at.cmp(&b.1.completed_at))
            .map(|(id, _)| id.clone());
        let Some(oldest_id) = oldest_id else { break };
        if let Some(result) = doc.results.shift_remove(&oldest_id) {
            append_jsonl(archive_path, &result)?;
        }
    }
    Ok(())
}

pub fn get_task_result(results_path: &Path, task_id: &str) -> Result<Option<TaskResult>, SupervisorError> {
    let doc: TaskResultsDocument = read_json(results_path)?;
    Ok(doc.results.get(task_id).cloned())
}

pub fn get_all_results(results_path: &Path) -> Result<Vec<TaskResult>, SupervisorError> {
    let doc: TaskResultsDocument = read_json(results_path)?;
    Ok(doc.results.into_values().collect())
}

/// A unified, timestamp-sorted view over queued/in-flight tasks and completed results, for a
/// terminal-style "what's recently happened" listing.
#[derive(Debug, Clone, Serialize)]
pub struct RecentTask {
    pub task_id: String,
    pub status: String,
    pub timestamp: String,
    pub description: Option<String>,
}

pub fn get_recent_tasks(queue_path: &Path, results_path: &Path, limit: usize) -> Result<Vec<RecentTask>, SupervisorError> {
    let queue: TaskQueueDocument = read_json(queue_path)?;
    let results: TaskResultsDocument = read_json(results_path)?;

    let mut items: Vec<RecentTask> = queue
        .tasks
        .into_iter()
        .map(|(id, task)| RecentTask {
            task_id: id,
            status: status_label(task.status),
            timestamp: task.created_at.clone(),
            description: Some(task.description),
        })
        .collect();
    items.extend(results.results.into_iter().map(|(id, result)| RecentTask {
        task_id: id,
        status: result.status,
        timestamp: result.completed_at,
        description: result.description,
    }));

    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(limit);
    Ok(items)
}

#[cfg(test)]
#[path = "results_tests.rs"]
mod tests;
