// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rule CRUD against the rules document (§6 command surface).

use std::path::Path;
use std::time::Duration;

use flowkeep_core::Rule;
use flowkeep_store::{with_lock, RulesDocument};
use serde::Serialize;

use crate::error::EngineError;

pub fn add_rule(path: &Path, rule_key: &str, rule: Rule, lock_timeout: Duration) -> Result<(), EngineError> {
    with_lock(path, lock_timeout, || {
        let mut doc: RulesDocument = flowkeep_store::read_json(path)?;
        doc.rules.insert(rule_key.to_string(), rule.clone());
        flowkeep_store::write_json(path, &doc)
    })?;
    Ok(())
}

pub fn update_rule(path: &Path, rule_key: &str, rule: Rule, lock_timeout: Duration) -> Result<(), EngineError> {
    let found = with_lock(path, lock_timeout, || {
        let mut doc: RulesDocument = flowkeep_store::read_json(path)?;
        let found = doc.rules.contains_key(rule_key);
        if found {
            doc.rules.insert(rule_key.to_string(), rule.clone());
            flowkeep_store::write_json(path, &doc)?;
        }
        Ok(found)
    })?;
    if found {
        Ok(())
    } else {
        Err(EngineError::NotFound(rule_key.to_string()))
    }
}

pub fn delete_rule(path: &Path, rule_key: &str, lock_timeout: Duration) -> Result<bool, EngineError> {
    let removed = with_lock(path, lock_timeout, || {
        let mut doc: RulesDocument = flowkeep_store::read_json(path)?;
        let removed = doc.rules.shift_remove(rule_key).is_some();
        if removed {
            flowkeep_store::write_json(path, &doc)?;
        }
        Ok(removed)
    })?;
    Ok(removed)
}

pub fn get_rule(path: &Path, rule_key: &str) -> Result<Rule, EngineError> {
    let doc: RulesDocument = flowkeep_store::read_json(path)?;
    doc.rules
        .get(rule_key)
        .cloned()
        .ok_or_else(|| EngineError::NotFound(rule_key.to_string()))
}

pub fn get_rules(path: &Path) -> Result<RulesDocument, EngineError> {
    Ok(flowkeep_store::read_json(path)?)
}

/// Lightweight per-rule summary for `list_rules` (§1b): the full action body is omitted.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub rule_key: String,
    pub trigger_type: String,
    pub trigger_file: Option<String>,
    pub has_condition: bool,
    pub enabled: bool,
}

pub fn list_rules(path: &Path) -> Result<Vec<RuleSummary>, EngineError> {
    let doc: RulesDocument = flowkeep_store::read_json(path)?;
    Ok(doc
        .rules
        .into_iter()
        .map(|(rule_key, rule)| RuleSummary {
            rule_key,
            trigger_type: trigger_type_name(&rule.trigger).to_string(),
            trigger_file: rule.trigger.file().map(str::to_string),
            has_condition: rule.condition.is_some(),
            enabled: rule.enabled,
        })
        .collect())
}

pub fn toggle_rule_enabled(path: &Path, rule_key: &str, enabled: bool, lock_timeout: Duration) -> Result<(), EngineError> {
    let found = with_lock(path, lock_timeout, || {
        let mut doc: RulesDocument = flowkeep_store::read_json(path)?;
        let found = if let Some(rule) = doc.rules.get_mut(rule_key) {
            rule.enabled = enabled;
            true
        } else {
            false
        };
        if found {
            flowkeep_store::write_json(path, &doc)?;
        }
        Ok(found)
    })?;
    if found {
        Ok(())
    } else {
        Err(EngineError::NotFound(rule_key.to_string()))
    }
}

fn trigger_type_name(trigger: &flowkeep_core::Trigger) -> &'static str {
    match trigger {
        flowkeep_core::Trigger::EntryAdded { .. } => "entry_added",
        flowkeep_core::Trigger::EntryUpdated { .. } => "entry_updated",
        flowkeep_core::Trigger::Time { .. } => "time",
        flowkeep_core::Trigger::Interval { .. } => "interval",
        flowkeep_core::Trigger::Event { .. } => "event",
    }
}

#[cfg(test)]
#[path = "rules_tests.rs"]
mod tests;
