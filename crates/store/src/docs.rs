// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Whole-file document shapes. Each mirrors exactly one persisted JSON file from §6 of the
//! spec this workspace implements; nothing here encodes policy, only shape.

use flowkeep_core::{Entry, EventType, Rule, Task, TaskResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `rules.json`: `{"rules": {rule_key -> Rule}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesDocument {
    #[serde(default)]
    pub rules: IndexMap<String, Rule>,
}

/// `event_types.json`: a bare mapping, `{event_key -> EventType}` (no wrapper key).
pub type EventTypesDocument = IndexMap<String, EventType>;

/// The engine's last-observed snapshot of one file-backed trigger's entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileSnapshot {
    #[serde(default)]
    pub entries: IndexMap<String, Entry>,
}

/// `engine_state.json`: per-file entry snapshots plus interval/time-trigger bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStateDocument {
    #[serde(default)]
    pub interval_executions: IndexMap<String, String>,
    /// Last `HH:MM` a `time` trigger fired for, keyed by rule_key. Closes the sub-minute
    /// idempotence REDESIGN FLAG: a `time` trigger is skipped when the current `HH:MM`
    /// matches the value recorded here.
    #[serde(default)]
    pub last_fired_minute: IndexMap<String, String>,
    #[serde(flatten, default)]
    pub files: IndexMap<String, FileSnapshot>,
}

/// One `execution_history.json` record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub rule_id: String,
    pub trigger: String,
    #[serde(default)]
    pub entry_id: Option<String>,
    pub action: String,
    pub result: String,
    pub duration_ms: u64,
}

/// `execution_history.json`: an append-only array of [`HistoryRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionHistoryDocument {
    #[serde(default)]
    pub history: Vec<HistoryRecord>,
}

/// The task queue document: `{"tasks": {task_id -> Task}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQueueDocument {
    #[serde(default)]
    pub tasks: IndexMap<String, Task>,
}

/// The task results document: `{"results": {task_id -> TaskResult}}`, capped at 10 entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskResultsDocument {
    #[serde(default)]
    pub results: IndexMap<String, TaskResult>,
}

#[cfg(test)]
#[path = "docs_tests.rs"]
mod tests;
