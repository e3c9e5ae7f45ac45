// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task and task-result shapes persisted in the supervisor's task queue and results
//! documents.

use crate::TaskStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_queued() -> TaskStatus {
    TaskStatus::Queued
}

/// A task as persisted in the queue document, keyed externally by its `task_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default = "default_queued")]
    pub status: TaskStatus,
    pub created_at: String,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub processing_started_at: Option<String>,
}

impl Task {
    /// The timestamp execution-time accounting should measure from: the most specific
    /// available of `processing_started_at` > `started_at` > `created_at`.
    pub fn execution_start(&self) -> &str {
        self.processing_started_at
            .as_deref()
            .or(self.started_at.as_deref())
            .unwrap_or(&self.created_at)
    }
}

/// Token-usage telemetry merged into a result record when a worker's one-shot sidecar file
/// is present at completion time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input: u64,
    #[serde(default)]
    pub output: u64,
    #[serde(default)]
    pub cache_read: u64,
    #[serde(default)]
    pub total: u64,
}

/// The outcome of a completed (or cancelled/errored) task, retained in the results document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    /// Normalized to `"done"` or `"error"` (or `"cancelled"`) -- never the raw status string
    /// a worker reported.
    pub status: String,
    #[serde(default)]
    pub actions_taken: Value,
    #[serde(default)]
    pub output: Value,
    pub completed_at: String,
    #[serde(default)]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub project_tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tokens: Option<TokenUsage>,
}

/// Normalize a worker-reported completion status into the two terminal result states the
/// queue distinguishes.
pub fn normalize_completion_status(raw: &str) -> &'static str {
    match raw {
        "completed" | "complete" | "done" => "done",
        _ => "error",
    }
}

/// Extract `#tag` mentions from a task description into a list of bare tag names.
pub fn extract_tags(description: &str) -> Vec<String> {
    let mut tags = Vec::new();
    for word in description.split_whitespace() {
        if let Some(rest) = word.strip_prefix('#') {
            let tag: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect();
            if !tag.is_empty() {
                tags.push(tag);
            }
        }
    }
    tags
}

/// Extract a `REQUEST_ID: <id>` token from a task description, if present.
pub fn extract_request_id(description: &str) -> Option<String> {
    let idx = description.find("REQUEST_ID:")?;
    let rest = description[idx + "REQUEST_ID:".len()..].trim_start();
    let id: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
