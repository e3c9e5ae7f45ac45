// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `validate_rule` and `dry_run_rule`/`dry_run_all_rules` (§4.4).

use chrono::{DateTime, Utc};
use flowkeep_core::{Action, EntriesDocument, Rule, Step, Trigger};
use serde::Serialize;
use serde_json::{json, Value};

use crate::fuzzy;
use crate::invoker::ToolCatalogEntry;

/// `validate_rule`'s result: either fully valid, or a list of human-readable errors (missing
/// trigger fields, an unknown tool/action, with a fuzzy-matched suggestion where one clears
/// the similarity threshold).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

const FUZZY_THRESHOLD: f64 = 0.6;

/// Check trigger-field presence, and tool/action existence against `catalog` (with a
/// best-effort fuzzy suggestion on a near-miss), recursing into workflow/foreach steps.
pub fn validate_rule(rule: &Rule, catalog: &[ToolCatalogEntry]) -> ValidationResult {
    let mut errors = Vec::new();

    match &rule.trigger {
        Trigger::EntryAdded { file } | Trigger::EntryUpdated { file } if file.trim().is_empty() => {
            errors.push("entry trigger requires a non-empty `file`".to_string());
        }
        Trigger::Time { at, daily } if at.is_none() && daily.is_none() => {
            errors.push("time trigger requires `at` (or `daily`)".to_string());
        }
        Trigger::Interval { minutes } if *minutes == 0 => {
            errors.push("interval trigger requires `minutes` > 0".to_string());
        }
        Trigger::Event { event_key } if event_key.trim().is_empty() => {
            errors.push("event trigger requires a non-empty `event_key`".to_string());
        }
        _ => {}
    }

    validate_action(&rule.action, catalog, &mut errors);
    if let Some(post) = &rule.post_action {
        validate_tool_action(&post.action.tool, &post.action.action, catalog, &mut errors);
    }

    ValidationResult { valid: errors.is_empty(), errors }
}

fn validate_action(action: &Action, catalog: &[ToolCatalogEntry], errors: &mut Vec<String>) {
    match action {
        Action::Leaf(leaf) => validate_tool_action(&leaf.tool, &leaf.action, catalog, errors),
        Action::Workflow { steps } => {
            for step in steps {
                validate_step(step, catalog, errors);
            }
        }
    }
}

fn validate_step(step: &Step, catalog: &[ToolCatalogEntry], errors: &mut Vec<String>) {
    match step {
        Step::Leaf(leaf) => validate_tool_action(&leaf.tool, &leaf.action, catalog, errors),
        Step::Foreach(fe) => {
            if fe.array.trim().is_empty() {
                errors.push("foreach step requires a non-empty `array` path".to_string());
            }
            for step in &fe.steps {
                validate_step(step, catalog, errors);
            }
        }
    }
}

fn validate_tool_action(tool: &str, action: &str, catalog: &[ToolCatalogEntry], errors: &mut Vec<String>) {
    if catalog.is_empty() {
        // No catalog to validate against (e.g. an invoker with no registry) -- nothing to say.
        return;
    }
    let Some(entry) = catalog.iter().find(|c| c.tool == tool) else {
        let names = catalog.iter().map(|c| c.tool.as_str());
        match fuzzy::best_match(tool, names, FUZZY_THRESHOLD) {
            Some((suggestion, _)) => errors.push(format!("unknown tool `{tool}` (did you mean `{suggestion}`?)")),
            None => errors.push(format!("unknown tool `{tool}`")),
        }
        return;
    };
    if !entry.actions.iter().any(|a| a == action) {
        let names = entry.actions.iter().map(String::as_str);
        match fuzzy::best_match(action, names, FUZZY_THRESHOLD) {
            Some((suggestion, _)) => {
                errors.push(format!("unknown action `{action}` for tool `{tool}` (did you mean `{suggestion}`?)"))
            }
            None => errors.push(format!("unknown action `{action}` for tool `{tool}`")),
        }
    }
}

/// One entry that would match a dry-run of an entry-triggered rule.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingEntry {
    pub id: String,
    pub reason: String,
}

/// One leaf invocation a dry run determined would execute, with params already resolved
/// against the simulated context.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedAction {
    pub tool: String,
    pub action: String,
    pub params: Value,
}

/// `dry_run_rule`'s result (§4.4): whether the rule would fire, which entries matched and why,
/// and the fully resolved actions that would run -- without running them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DryRunOutcome {
    pub would_fire: bool,
    pub matching_entries: Vec<MatchingEntry>,
    pub actions_that_would_execute: Vec<ResolvedAction>,
}

/// Simulate `rule`'s predicate evaluation without invoking any tool. `read_entries` is handed
/// the trigger's file path and returns its current document (the caller owns locking/reading
/// so this function stays pure and synchronous).
pub fn dry_run_rule(
    rule: &Rule,
    read_entries: impl Fn(&str) -> Option<EntriesDocument>,
    now: DateTime<Utc>,
) -> DryRunOutcome {
    let mut outcome = DryRunOutcome::default();

    match &rule.trigger {
        Trigger::EntryAdded { file } | Trigger::EntryUpdated { file } => {
            let Some(doc) = read_entries(file) else {
                return outcome;
            };
            for (key, entry) in doc.entries.iter() {
                if entry.status.blocks_dry_run() {
                    continue;
                }
                let scope = json!({"key": key, "old_entry": Value::Null, "new_entry": entry.to_context()});
                let condition_ok = rule.condition.as_deref().map_or(true, |expr| flowkeep_resolver::evaluate(expr, &scope, now));
                if !condition_ok {
                    continue;
                }
                outcome.would_fire = true;
                outcome.matching_entries.push(MatchingEntry { id: key.clone(), reason: "condition matched".to_string() });
                outcome.actions_that_would_execute.extend(resolve_actions(&rule.action, &scope));
            }
        }
        Trigger::Time { at, daily } => {
            let wanted = at.as_deref().or(daily.as_deref());
            let now_hhmm = now.format("%H:%M").to_string();
            if wanted == Some(now_hhmm.as_str()) {
                outcome.would_fire = true;
                outcome.actions_that_would_execute = resolve_actions(&rule.action, &Value::Null);
            }
        }
        Trigger::Interval { .. } => {
            outcome.would_fire = true;
            outcome.actions_that_would_execute = resolve_actions(&rule.action, &Value::Null);
        }
        Trigger::Event { .. } => {
            // An event trigger only fires on an explicit `dispatch_event` payload, which a
            // context-free dry run has no way to simulate.
        }
    }

    outcome
}

fn resolve_actions(action: &Action, scope: &Value) -> Vec<ResolvedAction> {
    let mut out = Vec::new();
    collect_actions(action, scope, &mut out);
    out
}

fn collect_actions(action: &Action, scope: &Value, out: &mut Vec<ResolvedAction>) {
    match action {
        Action::Leaf(leaf) => out.push(ResolvedAction {
            tool: leaf.tool.clone(),
            action: leaf.action.clone(),
            params: flowkeep_resolver::resolve(&leaf.params, scope),
        }),
        Action::Workflow { steps } => {
            for step in steps {
                match step {
                    Step::Leaf(leaf) => out.push(ResolvedAction {
                        tool: leaf.tool.clone(),
                        action: leaf.action.clone(),
                        params: flowkeep_resolver::resolve(&leaf.params, scope),
                    }),
                    Step::Foreach(fe) => {
                        for sub in &fe.steps {
                            if let Step::Leaf(leaf) = sub {
                                out.push(ResolvedAction {
                                    tool: leaf.tool.clone(),
                                    action: leaf.action.clone(),
                                    params: flowkeep_resolver::resolve(&leaf.params, scope),
                                });
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Per-rule summary returned by `dry_run_all_rules`.
#[derive(Debug, Clone, Serialize)]
pub struct DryRunAllEntry {
    pub rule_key: String,
    pub would_fire: bool,
    pub matching_count: usize,
    pub action_count: usize,
}

/// Run `dry_run_rule` over every enabled rule and return a per-rule summary.
pub fn dry_run_all_rules(
    rules: &indexmap::IndexMap<String, Rule>,
    read_entries: impl Fn(&str) -> Option<EntriesDocument>,
    now: DateTime<Utc>,
) -> Vec<DryRunAllEntry> {
    rules
        .iter()
        .filter(|(_, rule)| rule.enabled)
        .map(|(rule_key, rule)| {
            let result = dry_run_rule(rule, &read_entries, now);
            DryRunAllEntry {
                rule_key: rule_key.clone(),
                would_fire: result.would_fire,
                matching_count: result.matching_entries.len(),
                action_count: result.actions_that_would_execute.len(),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
