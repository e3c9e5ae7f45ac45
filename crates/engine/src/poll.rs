// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RuleEngine::run_once` (§4.4): one poll iteration over every enabled rule -- diffing
//! file-backed entry triggers against the last snapshot, firing time/interval triggers on
//! schedule, and running each matched rule's action and optional post-action.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowkeep_core::{Config, Entry, Rule, Trigger};
use flowkeep_store::{read_json, with_lock, write_json, EngineStateDocument, EntriesDocument, FileSnapshot, HistoryRecord, RulesDocument};
use serde_json::{json, Value};

use crate::actions::{run_action, ActionOutcome};
use crate::dedup::SessionDedup;
use crate::describe_action;
use crate::error::EngineError;
use crate::invoker::ToolInvoker;
use crate::queue_entry::process_queue_entry_with_lock;

/// One rule (and, for entry-triggered rules, one entry) that fired during a poll iteration.
#[derive(Debug, Clone)]
pub struct FiredRule {
    pub rule_key: String,
    pub entry_key: Option<String>,
    pub result: String,
}

/// Everything that happened in one `run_once` call.
#[derive(Debug, Clone, Default)]
pub struct PollOutcome {
    pub fired: Vec<FiredRule>,
}

/// Drives repeated poll iterations against a state directory, holding the session dedup set
/// and the invoker across iterations (§4.4, §5).
pub struct RuleEngine<'a> {
    config: &'a Config,
    invoker: &'a dyn ToolInvoker,
    lock_timeout: Duration,
    dedup: SessionDedup,
}

impl<'a> RuleEngine<'a> {
    pub fn new(config: &'a Config, invoker: &'a dyn ToolInvoker, lock_timeout: Duration) -> Self {
        Self { config, invoker, lock_timeout, dedup: SessionDedup::new() }
    }

    /// Run one full pass over every enabled rule: file-backed entry diffing, then time
    /// triggers, then interval triggers. Event triggers never fire here -- only via
    /// `dispatch_event`.
    pub fn run_once(&mut self, now: DateTime<Utc>) -> Result<PollOutcome, EngineError> {
        let rules_path = self.config.rules_file();
        let doc: RulesDocument = read_json(&rules_path)?;
        let now_iso = now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let mut outcome = PollOutcome::default();
        self.run_file_triggers(&doc, now, &now_iso, &mut outcome)?;
        self.run_time_triggers(&doc, now, &mut outcome)?;
        self.run_interval_triggers(&doc, now, &now_iso, &mut outcome)?;
        Ok(outcome)
    }

    fn run_file_triggers(
        &mut self,
        doc: &RulesDocument,
        now: DateTime<Utc>,
        now_iso: &str,
        outcome: &mut PollOutcome,
    ) -> Result<(), EngineError> {
        // Rules grouped by target file, preserving declaration order within each group so
        // `entry_added`'s "first matching rule wins" semantics are deterministic.
        let mut by_file: BTreeMap<String, Vec<(&String, &Rule)>> = BTreeMap::new();
        for (rule_key, rule) in doc.rules.iter() {
            if !rule.enabled {
                continue;
            }
            if let Some(file) = rule.trigger.file() {
                by_file.entry(file.to_string()).or_default().push((rule_key, rule));
            }
        }

        for (file, rules) in by_file {
            let entries_path = self.config.entries_file(&file);
            let engine_state_path = self.config.engine_state_file();

            let current: EntriesDocument = read_json(&entries_path)?;
            let mut state: EngineStateDocument = read_json(&engine_state_path)?;
            let prior = state.files.get(&file).cloned().unwrap_or_default();

            for (key, entry) in current.entries.iter() {
                let prior_entry = prior.entries.get(key);
                let is_new = prior_entry.is_none();
                let changed = prior_entry.map_or(true, |p| !entries_equal(p, entry));
                if !is_new && !changed {
                    continue;
                }

                for (rule_key, rule) in &rules {
                    let applies = match &rule.trigger {
                        Trigger::EntryAdded { .. } => is_new && !entry.status.blocks_entry_added(),
                        Trigger::EntryUpdated { .. } => !is_new && changed && !entry.status.blocks_entry_updated(),
                        _ => false,
                    };
                    if !applies {
                        continue;
                    }

                    let dedup_key = match &rule.trigger {
                        Trigger::EntryAdded { .. } => format!("added:{file}:{key}"),
                        Trigger::EntryUpdated { .. } => format!("updated:{file}:{key}:{rule_key}:{}", entry.status),
                        _ => unreachable!("filtered above"),
                    };
                    if !self.dedup.mark(dedup_key) {
                        continue;
                    }

                    let scope = json!({
                        "key": key,
                        "old_entry": prior_entry.map(Entry::to_context).unwrap_or(Value::Null),
                        "new_entry": entry.to_context(),
                    });
                    if let Some(condition) = &rule.condition {
                        if !flowkeep_resolver::evaluate(condition, &scope, now) {
                            continue;
                        }
                    }

                    let processed = process_queue_entry_with_lock(
                        &entries_path,
                        key,
                        &rule.action,
                        rule.timeout_or_default(),
                        self.invoker,
                        now_iso,
                        self.lock_timeout,
                    )?;
                    let Some(processed) = processed else {
                        // Claimed by a concurrent writer, or already terminally handled, between
                        // the diff above and the claim attempt.
                        continue;
                    };

                    self.record_history(rule_key, "entry", Some(key.clone()), rule, &processed.outcome, now)?;
                    outcome.fired.push(FiredRule {
                        rule_key: (*rule_key).clone(),
                        entry_key: Some(key.clone()),
                        result: processed.outcome.result_label().to_string(),
                    });

                    if let ActionOutcome::Completed { output, .. } = &processed.outcome {
                        self.run_post_action(rule, &scope, output, now)?;
                    }
                }
            }

            // Re-read: processing above may have mutated statuses in this file out from under
            // the `current` read taken at the top of this loop.
            let settled: EntriesDocument = read_json(&entries_path)?;
            state.files.insert(file, snapshot_of(&settled));
            write_json(&engine_state_path, &state)?;
        }

        Ok(())
    }

    fn run_time_triggers(&mut self, doc: &RulesDocument, now: DateTime<Utc>, outcome: &mut PollOutcome) -> Result<(), EngineError> {
        let now_hhmm = now.format("%H:%M").to_string();
        let engine_state_path = self.config.engine_state_file();

        for (rule_key, rule) in doc.rules.iter() {
            if !rule.enabled {
                continue;
            }
            let Trigger::Time { .. } = &rule.trigger else {
                continue;
            };
            if rule.trigger.time_of_day() != Some(now_hhmm.as_str()) {
                continue;
            }

            let already_fired = with_lock(&engine_state_path, self.lock_timeout, || {
                let mut state: EngineStateDocument = read_json(&engine_state_path)?;
                if state.last_fired_minute.get(rule_key).map(String::as_str) == Some(now_hhmm.as_str()) {
                    return Ok(true);
                }
                state.last_fired_minute.insert(rule_key.clone(), now_hhmm.clone());
                write_json(&engine_state_path, &state)?;
                Ok(false)
            })?;
            if already_fired {
                continue;
            }

            let action_outcome = run_action(self.invoker, &rule.action, &Value::Null, rule.timeout_or_default());
            self.record_history(rule_key, "time", None, rule, &action_outcome, now)?;
            outcome.fired.push(FiredRule { rule_key: rule_key.clone(), entry_key: None, result: action_outcome.result_label().to_string() });
        }

        Ok(())
    }

    fn run_interval_triggers(&mut self, doc: &RulesDocument, now: DateTime<Utc>, now_iso: &str, outcome: &mut PollOutcome) -> Result<(), EngineError> {
        let engine_state_path = self.config.engine_state_file();

        for (rule_key, rule) in doc.rules.iter() {
            if !rule.enabled {
                continue;
            }
            let Trigger::Interval { minutes } = &rule.trigger else {
                continue;
            };

            let due = with_lock(&engine_state_path, self.lock_timeout, || {
                let mut state: EngineStateDocument = read_json(&engine_state_path)?;
                let due = match state.interval_executions.get(rule_key).and_then(|s| flowkeep_core::parse_timestamp(s)) {
                    Some(last) => now.signed_duration_since(last) >= chrono::Duration::minutes(*minutes as i64),
                    None => true,
                };
                if due {
                    state.interval_executions.insert(rule_key.clone(), now_iso.to_string());
                    write_json(&engine_state_path, &state)?;
                }
                Ok(due)
            })?;
            if !due {
                continue;
            }

            let action_outcome = run_action(self.invoker, &rule.action, &Value::Null, rule.timeout_or_default());
            self.record_history(rule_key, "interval", None, rule, &action_outcome, now)?;
            outcome.fired.push(FiredRule { rule_key: rule_key.clone(), entry_key: None, result: action_outcome.result_label().to_string() });
        }

        Ok(())
    }

    fn run_post_action(&self, rule: &Rule, scope: &Value, primary_output: &Value, now: DateTime<Utc>) -> Result<(), EngineError> {
        let Some(post) = &rule.post_action else {
            return Ok(());
        };

        let mut base_scope = scope.clone();
        if let Value::Object(map) = &mut base_scope {
            map.insert("output".to_string(), primary_output.clone());
        }

        let items: Vec<Value> = match &post.for_each {
            Some(path) => match flowkeep_resolver::resolve_path(path, &base_scope) {
                Some(Value::Array(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            },
            None => vec![Value::Null],
        };

        for item in items {
            let mut item_scope = base_scope.clone();
            if let Value::Object(map) = &mut item_scope {
                map.insert("item".to_string(), item);
            }
            if let Some(condition) = &post.condition {
                if !flowkeep_resolver::evaluate(condition, &item_scope, now) {
                    continue;
                }
            }
            let params = flowkeep_resolver::resolve(&post.action.params, &item_scope);
            let timeout = post.action.timeout.map(Duration::from_secs).unwrap_or(rule.timeout_or_default());
            let bypass = self.invoker.resolves(&post.action.tool);
            // Post-actions are fire-and-forget: the rule's own entry status already settled on
            // the primary action's outcome, so a post-action failure is swallowed here rather
            // than propagated.
            let _ = self.invoker.invoke(&post.action.tool, &post.action.action, &params, bypass, timeout);
        }

        Ok(())
    }

    fn record_history(
        &self,
        rule_key: &str,
        trigger: &str,
        entry_id: Option<String>,
        rule: &Rule,
        outcome: &ActionOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let record = HistoryRecord {
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            rule_id: rule_key.to_string(),
            trigger: trigger.to_string(),
            entry_id,
            action: describe_action(&rule.action),
            result: outcome.result_label().to_string(),
            duration_ms: outcome.duration().as_millis() as u64,
        };
        flowkeep_store::append_history(&self.config.execution_history_file(), record, now)?;
        Ok(())
    }
}

fn entries_equal(a: &Entry, b: &Entry) -> bool {
    a.to_context() == b.to_context()
}

fn snapshot_of(doc: &EntriesDocument) -> FileSnapshot {
    FileSnapshot { entries: doc.entries.clone() }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
