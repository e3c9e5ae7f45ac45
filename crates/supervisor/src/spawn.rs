// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded parallel worker spawning, the supervisor lockfile, and `kill_agents` (§4.1 stale
//! reclamation, §4.5 Spawning).

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowkeep_core::{Task, TaskStatus};
use flowkeep_lock::{is_pid_alive, LockMeta};
use flowkeep_store::{read_json, write_json, TaskQueueDocument};
use serde::Serialize;

use crate::error::SupervisorError;
use crate::MAX_PARALLEL_AGENTS;

/// Presence of this env var marks the current process as an already-spawned worker; an
/// `execute_queue` call made from inside one is refused.
pub const NESTING_GUARD_ENV: &str = "FLOWKEEP_INSIDE_WORKER";

/// The external-collaborator interface the supervisor spawns workers through. A concrete,
/// process-based implementation lives in the adapters layer.
pub trait WorkerSpawner: Send + Sync {
    /// Spawn a detached worker in its own session, told to claim `task_count` tasks (filtered
    /// to `agent_id` when `Some`), with stdout/stderr redirected to `log_path`. The child's
    /// environment must carry [`NESTING_GUARD_ENV`] regardless of what this process inherited.
    /// Returns the child's pid.
    fn spawn(&self, agent_id: Option<&str>, task_count: usize, log_path: &Path) -> std::io::Result<u32>;
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteQueueOutcome {
    pub spawned_pids: Vec<u32>,
    pub task_count: usize,
    pub parallel: usize,
    pub agents: Vec<String>,
}

fn read_lock_meta(path: &Path) -> Option<LockMeta> {
    let bytes = std::fs::read(path).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Spawn worker processes for the queued tasks, honoring the nesting guard, the parallelism
/// cap, and stale-lock reclamation.
#[allow(clippy::too_many_arguments)]
pub fn execute_queue(
    spawner: &dyn WorkerSpawner,
    queue_path: &Path,
    lock_path: &Path,
    log_dir: &Path,
    requested_parallel: usize,
    agent_id_filter: Option<&str>,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Result<ExecuteQueueOutcome, SupervisorError> {
    if std::env::var(NESTING_GUARD_ENV).is_ok() {
        return Err(SupervisorError::NestedSpawn);
    }
    let parallel = requested_parallel.clamp(1, MAX_PARALLEL_AGENTS);

    let _guard = flowkeep_lock::acquire(lock_path, lock_timeout)?;

    if let Some(meta) = read_lock_meta(lock_path) {
        if !meta.is_stale(now) {
            return Err(SupervisorError::AlreadyRunning(meta.pids.len()));
        }
        tracing::info!(pids = ?meta.pids, "reclaiming stale supervisor lock");
    }
    let _ = std::fs::remove_file(lock_path);

    let queue: TaskQueueDocument = read_json(queue_path)?;
    let queued: Vec<(&String, &Task)> = queue
        .tasks
        .iter()
        .filter(|(_, task)| task.status == TaskStatus::Queued)
        .collect();

    if queued.is_empty() {
        return Ok(ExecuteQueueOutcome {
            spawned_pids: vec![],
            task_count: 0,
            parallel,
            agents: vec![],
        });
    }

    std::fs::create_dir_all(log_dir).map_err(SupervisorError::Spawn)?;

    let agent_ids: Vec<String> = match agent_id_filter {
        Some(filter) => vec![filter.to_string()],
        None => {
            let mut seen = Vec::new();
            for (_, task) in &queued {
                if let Some(agent) = &task.agent_id {
                    if !seen.contains(agent) {
                        seen.push(agent.clone());
                    }
                }
                if seen.len() >= parallel {
                    break;
                }
            }
            seen
        }
    };

    let mut pids = Vec::new();
    if agent_ids.is_empty() {
        let log_path = log_dir.join("worker.log");
        let pid = spawner.spawn(None, queued.len(), &log_path).map_err(SupervisorError::Spawn)?;
        pids.push(pid);
        tracing::info!(pid, task_count = queued.len(), "spawned single-agent worker");
    } else {
        for agent in &agent_ids {
            let count = queued
                .iter()
                .filter(|(_, task)| task.agent_id.as_deref() == Some(agent.as_str()))
                .count();
            let log_path = log_dir.join(format!("{agent}.log"));
            let pid = spawner.spawn(Some(agent), count, &log_path).map_err(SupervisorError::Spawn)?;
            pids.push(pid);
            tracing::info!(pid, agent = %agent, task_count = count, "spawned worker");
        }
    }

    let meta = LockMeta {
        created_at: now,
        pids: pids.clone(),
        task_count: queued.len(),
        parallel,
        agents: agent_ids.clone(),
    };
    write_json(lock_path, &meta)?;

    Ok(ExecuteQueueOutcome {
        spawned_pids: pids,
        task_count: queued.len(),
        parallel,
        agents: agent_ids,
    })
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KillReport {
    pub killed: Vec<u32>,
    pub already_dead: Vec<u32>,
}

/// Best-effort `SIGKILL` of every pid recorded in the supervisor lockfile, then remove it.
pub fn kill_agents(lock_path: &Path) -> KillReport {
    let Some(meta) = read_lock_meta(lock_path) else {
        return KillReport::default();
    };

    let mut report = KillReport::default();
    for &pid in &meta.pids {
        if is_pid_alive(pid) {
            if let Ok(raw) = i32::try_from(pid) {
                let _ = nix::sys::signal::kill(nix::unistd::Pid::from_raw(raw), nix::sys::signal::Signal::SIGKILL);
            }
            report.killed.push(pid);
        } else {
            report.already_dead.push(pid);
        }
    }
    let _ = std::fs::remove_file(lock_path);
    report
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
