// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `validate_rule`, `dry_run_rule`, `dry_run_all_rules`.

use anyhow::Result;
use flowkeep_adapters::ProcessToolInvoker;
use flowkeep_core::{Config, EntriesDocument, Rule};
use flowkeep_engine::ToolInvoker;
use flowkeep_store::{read_json, RulesDocument};
use serde_json::{json, Value};

use super::require;

fn read_entries_for(config: &Config) -> impl Fn(&str) -> Option<EntriesDocument> + '_ {
    move |file: &str| read_json(&config.entries_file(file)).ok()
}

pub fn validate_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule: Rule = require(params, "rule")?;
    let invoker = ProcessToolInvoker::load(&config.tools_file())?;
    let result = flowkeep_engine::validate_rule(&rule, &invoker.catalog());
    Ok(json!({"status": "success", "valid": result.valid, "errors": result.errors}))
}

pub fn dry_run_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule: Rule = require(params, "rule")?;
    let outcome = flowkeep_engine::dry_run_rule(&rule, read_entries_for(config), chrono::Utc::now());
    Ok(json!({"status": "success", "outcome": outcome}))
}

pub fn dry_run_all_rules(config: &Config, _params: &Value) -> Result<Value> {
    let doc: RulesDocument = read_json(&config.rules_file())?;
    let summary = flowkeep_engine::dry_run_all_rules(&doc.rules, read_entries_for(config), chrono::Utc::now());
    Ok(json!({"status": "success", "rules": summary}))
}
