// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Metadata and staleness checks for the agent supervisor's long-lived lockfile.

use chrono::{DateTime, Utc};
use nix::sys::signal;
use nix::unistd::Pid;
use serde::{Deserialize, Serialize};

use crate::STALE_AGE;

/// JSON metadata carried by the supervisor's lockfile alongside the OS-level lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMeta {
    pub created_at: DateTime<Utc>,
    pub pids: Vec<u32>,
    #[serde(default)]
    pub task_count: usize,
    #[serde(default)]
    pub parallel: usize,
    #[serde(default)]
    pub agents: Vec<String>,
}

impl LockMeta {
    /// A lock is stale if it is older than [`STALE_AGE`], or if none of its recorded pids are
    /// still alive. Either condition alone is sufficient.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        let too_old = age
            .to_std()
            .map(|d| d > STALE_AGE)
            .unwrap_or(true); // negative duration (clock skew) -- treat as stale, don't trust it
        too_old || !self.pids.iter().any(|&pid| is_pid_alive(pid))
    }
}

/// Send signal 0 to `pid`: succeeds (no-op) iff a process with that pid exists and is
/// signalable by us. Any other outcome (not found, permission denied on a foreign pid) is
/// treated as "not alive" for reclamation purposes.
pub fn is_pid_alive(pid: u32) -> bool {
    match i32::try_from(pid) {
        Ok(raw) => signal::kill(Pid::from_raw(raw), None).is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "stale_tests.rs"]
mod tests;
