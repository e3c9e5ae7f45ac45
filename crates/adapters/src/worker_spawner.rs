// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A process-based [`WorkerSpawner`]: each spawn launches a fresh copy of the worker binary
//! against the `process-queue` subcommand, with stdout/stderr redirected to the given log file
//! and the nesting guard set so the child refuses to call `execute_queue` itself. `task_count`
//! is not passed through -- `claim` already scopes to the given `agent_id`'s queued tasks on
//! its own, so the spawned process needs no separate count argument.
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use flowkeep_supervisor::{WorkerSpawner, NESTING_GUARD_ENV};

/// Spawns `<worker_command> process-queue [--params {"agent_id": "..."}]` as a child process.
pub struct ProcessWorkerSpawner {
    worker_command: PathBuf,
}

impl ProcessWorkerSpawner {
    pub fn new(worker_command: PathBuf) -> Self {
        Self { worker_command }
    }
}

impl WorkerSpawner for ProcessWorkerSpawner {
    fn spawn(&self, agent_id: Option<&str>, _task_count: usize, log_path: &Path) -> std::io::Result<u32> {
        let log_file = File::create(log_path)?;
        let err_file = log_file.try_clone()?;

        let mut cmd = Command::new(&self.worker_command);
        cmd.arg("process-queue");
        if let Some(agent_id) = agent_id {
            cmd.arg("--params").arg(serde_json::json!({"agent_id": agent_id}).to_string());
        }
        cmd.env(NESTING_GUARD_ENV, "1")
            .stdin(Stdio::null())
            .stdout(Stdio::from(log_file))
            .stderr(Stdio::from(err_file));

        let child = cmd.spawn()?;
        Ok(child.id())
    }
}

#[cfg(test)]
#[path = "worker_spawner_tests.rs"]
mod tests;
