// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task queue CRUD and claim semantics (§4.5).

use std::path::Path;
use std::time::Duration;

use flowkeep_core::{IdGen, Task, TaskId, TaskStatus};
use flowkeep_store::{read_json, with_lock, write_json, TaskQueueDocument};
use serde_json::Value;

use crate::error::SupervisorError;
use crate::MAX_PARALLEL_AGENTS;

/// Enqueue one task, returning its generated id.
#[allow(clippy::too_many_arguments)]
pub fn assign_task(
    path: &Path,
    id_gen: &dyn IdGen,
    description: String,
    context: Value,
    priority: Option<i64>,
    batch_id: Option<String>,
    agent_id: Option<String>,
    now: &str,
    lock_timeout: Duration,
) -> Result<TaskId, SupervisorError> {
    let task_id = TaskId::new(id_gen.next());
    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        doc.tasks.insert(
            task_id.as_str().to_string(),
            Task {
                description,
                context,
                priority,
                batch_id,
                agent_id,
                status: TaskStatus::Queued,
                created_at: now.to_string(),
                started_at: None,
                processing_started_at: None,
            },
        );
        write_json(path, &doc)?;
        Ok(())
    })?;
    Ok(task_id)
}

/// Enqueue several tasks at once, distributing them round-robin across `agent_count` agent
/// slots (clamped to `[1, MAX_PARALLEL_AGENTS]`) so that a subsequent parallel `execute_queue`
/// can partition them disjointly.
pub fn batch_assign_tasks(
    path: &Path,
    id_gen: &dyn IdGen,
    descriptions: Vec<String>,
    context: Value,
    priority: Option<i64>,
    batch_id: Option<String>,
    agent_count: usize,
    now: &str,
    lock_timeout: Duration,
) -> Result<Vec<TaskId>, SupervisorError> {
    let agent_count = agent_count.clamp(1, MAX_PARALLEL_AGENTS);
    let mut ids = Vec::with_capacity(descriptions.len());

    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        for (i, description) in descriptions.into_iter().enumerate() {
            let task_id = TaskId::new(id_gen.next());
            let agent_id = format!("agent-{}", i % agent_count);
            doc.tasks.insert(
                task_id.as_str().to_string(),
                Task {
                    description,
                    context: context.clone(),
                    priority,
                    batch_id: batch_id.clone(),
                    agent_id: Some(agent_id),
                    status: TaskStatus::Queued,
                    created_at: now.to_string(),
                    started_at: None,
                    processing_started_at: None,
                },
            );
            ids.push(task_id);
        }
        write_json(path, &doc)?;
        Ok(())
    })?;
    Ok(ids)
}

/// Mark a task `cancelled`. It remains in the queue for inspection, like a terminal `error`.
pub fn cancel_task(path: &Path, task_id: &str, now: &str, lock_timeout: Duration) -> Result<bool, SupervisorError> {
    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        let Some(task) = doc.tasks.get_mut(task_id) else {
            return Ok(false);
        };
        task.status = TaskStatus::Cancelled;
        task.started_at.get_or_insert_with(|| now.to_string());
        write_json(path, &doc)?;
        Ok(true)
    })
}

/// Fields an in-flight `update_task` call may change. Only permitted while the task is still
/// `queued`.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub description: Option<String>,
    pub context: Option<Value>,
    pub priority: Option<Option<i64>>,
    pub agent_id: Option<Option<String>>,
}

pub fn update_task(
    path: &Path,
    task_id: &str,
    update: TaskUpdate,
    lock_timeout: Duration,
) -> Result<bool, SupervisorError> {
    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        let Some(task) = doc.tasks.get_mut(task_id) else {
            return Ok(false);
        };
        if task.status != TaskStatus::Queued {
            return Ok(false);
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(context) = update.context {
            task.context = context;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(agent_id) = update.agent_id {
            task.agent_id = agent_id;
        }
        write_json(path, &doc)?;
        Ok(true)
    })
}

/// Atomically transition every matching `queued` task to `in_progress`, stamping `started_at`
/// identically for the whole batch, and return the claimed tasks. When `agent_id` is `Some`,
/// only tasks whose `agent_id` matches are claimed.
pub fn claim(
    path: &Path,
    agent_id: Option<&str>,
    now: &str,
    lock_timeout: Duration,
) -> Result<Vec<(TaskId, Task)>, SupervisorError> {
    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        let mut claimed = Vec::new();
        for (id, task) in doc.tasks.iter_mut() {
            if task.status != TaskStatus::Queued {
                continue;
            }
            if let Some(wanted) = agent_id {
                if task.agent_id.as_deref() != Some(wanted) {
                    continue;
                }
            }
            task.status = TaskStatus::InProgress;
            task.started_at = Some(now.to_string());
            claimed.push((TaskId::new(id.clone()), task.clone()));
        }
        write_json(path, &doc)?;
        Ok(claimed)
    })
}

/// Stamp `processing_started_at` on a specific claimed task, called by the worker when it
/// actually begins that task (as opposed to when the batch was claimed).
pub fn mark_in_progress(path: &Path, task_id: &str, now: &str, lock_timeout: Duration) -> Result<bool, SupervisorError> {
    with_lock(path, lock_timeout, || {
        let mut doc: TaskQueueDocument = read_json(path)?;
        let Some(task) = doc.tasks.get_mut(task_id) else {
            return Ok(false);
        };
        task.processing_started_at = Some(now.to_string());
        write_json(path, &doc)?;
        Ok(true)
    })
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
