// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dispatch_event` (§1b, §4.4 step 7): run every enabled rule whose trigger is
//! `{type: "event", event_key}` against an out-of-band payload.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowkeep_core::Trigger;
use flowkeep_store::{append_history, read_json, HistoryRecord};
use serde_json::Value;

use crate::actions::run_action;
use crate::describe_action;
use crate::error::EngineError;
use crate::invoker::ToolInvoker;

/// One rule's outcome from a `dispatch_event` call.
pub struct DispatchedRule {
    pub rule_key: String,
    pub outcome: crate::ActionOutcome,
}

/// Run every enabled rule whose trigger is `event` and matches `event_key`, passing `payload`
/// directly as the action context. Returns the per-rule outcomes and logs one ExecutionHistory
/// record per rule fired.
pub fn dispatch_event(
    rules_path: &Path,
    history_path: &Path,
    event_key: &str,
    payload: &Value,
    invoker: &dyn ToolInvoker,
    now: DateTime<Utc>,
    lock_timeout: Duration,
) -> Result<Vec<DispatchedRule>, EngineError> {
    let doc: flowkeep_store::RulesDocument = read_json(rules_path)?;
    let mut fired = Vec::new();

    for (rule_key, rule) in doc.rules.iter() {
        if !rule.enabled {
            continue;
        }
        let Trigger::Event { event_key: wanted } = &rule.trigger else {
            continue;
        };
        if wanted != event_key {
            continue;
        }

        let outcome = run_action(invoker, &rule.action, payload, rule.timeout_or_default());
        let record = HistoryRecord {
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            rule_id: rule_key.clone(),
            trigger: "event".to_string(),
            entry_id: None,
            action: describe_action(&rule.action),
            result: outcome.result_label().to_string(),
            duration_ms: outcome.duration().as_millis() as u64,
        };
        append_history(history_path, record, now)?;
        fired.push(DispatchedRule { rule_key: rule_key.clone(), outcome });
    }

    Ok(fired)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
