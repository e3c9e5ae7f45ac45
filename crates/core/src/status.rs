// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry and task status state machines.

use serde::{Deserialize, Serialize};

/// Status of an entry tracked by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Queued,
    Processing,
    Processed,
    Failed,
    TimeoutFailed,
    PermanentlyFailed,
}

impl EntryStatus {
    /// Statuses an `entry_added` trigger must skip: the entry has already been claimed or
    /// terminally handled.
    pub fn blocks_entry_added(self) -> bool {
        matches!(self, Self::Processed | Self::Processing | Self::Failed)
    }

    /// Statuses an `entry_updated` trigger must skip.
    pub fn blocks_entry_updated(self) -> bool {
        matches!(self, Self::Processing | Self::Failed)
    }

    /// Statuses `dry_run_rule` must skip when simulating entry triggers.
    pub fn blocks_dry_run(self) -> bool {
        matches!(
            self,
            Self::Processed | Self::Processing | Self::Failed | Self::TimeoutFailed | Self::PermanentlyFailed
        )
    }

    /// Statuses eligible for the retry ladder.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Failed | Self::TimeoutFailed)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string());
        write!(f, "{s}")
    }
}

/// Status of a task tracked by the agent supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    InProgress,
    Error,
    Cancelled,
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
