// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State directory resolution and the file layout rooted under it.
//!
//! Grounded on the teacher daemon's own `Config::load`/`state_dir` priority chain: an explicit
//! env var wins (used by tests and by callers that want full control), then XDG, then the
//! platform-conventional fallback under `$HOME`.

use std::env;
use std::path::PathBuf;

/// Errors resolving or creating the state directory.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no state directory: set FLOWKEEP_STATE_DIR, XDG_STATE_HOME, or HOME")]
    NoStateDir,
    #[error("failed to create state directory {0}: {1}")]
    CreateDir(PathBuf, #[source] std::io::Error),
}

/// Resolved file layout, all paths rooted under a single state directory.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
}

impl Config {
    /// Resolve the state directory: `FLOWKEEP_STATE_DIR` env var, then
    /// `$XDG_STATE_HOME/flowkeep`, then `~/.local/state/flowkeep`. Creates the directory (and
    /// its `agents/` log subdirectory) if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let state_dir = Self::state_dir()?;
        std::fs::create_dir_all(&state_dir)
            .map_err(|e| ConfigError::CreateDir(state_dir.clone(), e))?;
        std::fs::create_dir_all(state_dir.join("agents"))
            .map_err(|e| ConfigError::CreateDir(state_dir.clone(), e))?;
        Ok(Self { state_dir })
    }

    fn state_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = env::var("FLOWKEEP_STATE_DIR") {
            return Ok(PathBuf::from(dir));
        }
        if let Ok(xdg) = env::var("XDG_STATE_HOME") {
            return Ok(PathBuf::from(xdg).join("flowkeep"));
        }
        let home = env::var("HOME").map_err(|_| ConfigError::NoStateDir)?;
        Ok(PathBuf::from(home).join(".local").join("state").join("flowkeep"))
    }

    pub fn rules_file(&self) -> PathBuf {
        self.state_dir.join("rules.json")
    }

    pub fn event_types_file(&self) -> PathBuf {
        self.state_dir.join("event_types.json")
    }

    pub fn engine_state_file(&self) -> PathBuf {
        self.state_dir.join("engine_state.json")
    }

    pub fn execution_history_file(&self) -> PathBuf {
        self.state_dir.join("execution_history.json")
    }

    /// The data file tracked by a file-backed trigger, addressed by logical name (callers pass
    /// whatever `file` the rule's trigger names; this resolves it under the state dir when it
    /// is not already absolute).
    pub fn entries_file(&self, logical_name: &str) -> PathBuf {
        let path = PathBuf::from(logical_name);
        if path.is_absolute() {
            path
        } else {
            self.state_dir.join("entries").join(logical_name)
        }
    }

    pub fn task_queue_file(&self) -> PathBuf {
        self.state_dir.join("task_queue.json")
    }

    pub fn task_results_file(&self) -> PathBuf {
        self.state_dir.join("task_results.json")
    }

    pub fn results_archive_file(&self) -> PathBuf {
        self.state_dir.join("task_results_archive.jsonl")
    }

    pub fn supervisor_lock_file(&self) -> PathBuf {
        self.state_dir.join("supervisor.lock")
    }

    pub fn agent_log_file(&self, agent_id: &str) -> PathBuf {
        self.state_dir.join("agents").join(format!("{agent_id}.log"))
    }

    /// Registry of tool executables the process-based invoker reads at startup.
    pub fn tools_file(&self) -> PathBuf {
        self.state_dir.join("tools.json")
    }

    /// Directory `log_task_completion` drops one `<REQUEST_ID>.json` form file into per task
    /// that named one.
    pub fn results_dir(&self) -> PathBuf {
        self.state_dir.join("results")
    }

    /// One-shot token-usage sidecar a worker may drop before calling `log_task_completion`.
    pub fn token_sidecar_file(&self, task_id: &str) -> PathBuf {
        self.state_dir.join("tokens").join(format!("{task_id}.json"))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
