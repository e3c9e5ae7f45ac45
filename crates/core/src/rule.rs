// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule, trigger, and action shapes persisted in the rules document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

fn default_true() -> bool {
    true
}

/// What causes a rule to become eligible to fire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires once per key newly present (and not already terminally handled) in `file`.
    EntryAdded { file: String },
    /// Fires once per key present in both the prior and current snapshot of `file` whose
    /// status is eligible, deduplicated on `(file, key, rule_key, status)`.
    EntryUpdated { file: String },
    /// Fires when the wall-clock `HH:MM` matches `at` (or `daily`, an alias kept for
    /// compatibility with rules authored against the original tool).
    Time {
        #[serde(default)]
        at: Option<String>,
        #[serde(default)]
        daily: Option<String>,
    },
    /// Fires when at least `minutes` have elapsed since the rule's last recorded execution.
    Interval { minutes: u64 },
    /// Fires only via an explicit `dispatch_event(event_key, payload)` call.
    Event { event_key: String },
}

impl Trigger {
    pub fn file(&self) -> Option<&str> {
        match self {
            Trigger::EntryAdded { file } | Trigger::EntryUpdated { file } => Some(file),
            _ => None,
        }
    }

    /// The `HH:MM` this time trigger matches against, preferring `at` over the `daily` alias.
    pub fn time_of_day(&self) -> Option<&str> {
        match self {
            Trigger::Time { at, daily } => at.as_deref().or(daily.as_deref()),
            _ => None,
        }
    }
}

/// A single tool invocation: `{tool, action, params, timeout?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafAction {
    pub tool: String,
    pub action: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// One step of a multi-step workflow: either a plain invocation or a `foreach` fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Foreach(ForeachStep),
    Leaf(LeafAction),
}

/// A step that resolves a dotted array path and runs its sub-steps once per item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeachStep {
    pub array: String,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// A rule's primary action: one invocation, or an ordered list of steps threading
/// `previous_output` between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Action {
    Workflow { steps: Vec<Step> },
    Leaf(LeafAction),
}

/// An optional action run after the primary action, fanned out over a result array/mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostAction {
    pub for_each: Option<String>,
    pub condition: Option<String>,
    pub action: LeafAction,
}

/// A rule as persisted in the rules document, keyed externally by its `rule_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub trigger: Trigger,
    pub action: Action,
    #[serde(default)]
    pub post_action: Option<PostAction>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub retry_delay_base: Option<u64>,
}

impl Rule {
    pub fn timeout_or_default(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout.unwrap_or(30))
    }
}

/// A named predicate over `(key, old_entry, new_entry)` gating whether a rule may fire on a
/// given diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventType {
    pub test: String,
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
