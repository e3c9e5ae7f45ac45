// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `add_rule`, `update_rule`, `delete_rule`, `get_rule`, `get_rules`, `list_rules`,
//! `toggle_rule_enabled`.

use anyhow::Result;
use flowkeep_core::Config;
use serde_json::{json, Value};

use super::{require, require_str};

pub fn add_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule_key: String = require(params, "rule_key")?;
    let rule = require(params, "rule")?;
    flowkeep_engine::rules::add_rule(&config.rules_file(), &rule_key, rule, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "rule_key": rule_key}))
}

pub fn update_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule_key: String = require(params, "rule_key")?;
    let rule = require(params, "rule")?;
    flowkeep_engine::rules::update_rule(&config.rules_file(), &rule_key, rule, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "rule_key": rule_key}))
}

pub fn delete_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule_key = require_str(params, "rule_key")?;
    let removed = flowkeep_engine::rules::delete_rule(&config.rules_file(), rule_key, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "removed": removed}))
}

pub fn get_rule(config: &Config, params: &Value) -> Result<Value> {
    let rule_key = require_str(params, "rule_key")?;
    let rule = flowkeep_engine::rules::get_rule(&config.rules_file(), rule_key)?;
    Ok(json!({"status": "success", "rule": rule}))
}

pub fn get_rules(config: &Config, _params: &Value) -> Result<Value> {
    let doc = flowkeep_engine::rules::get_rules(&config.rules_file())?;
    Ok(json!({"status": "success", "rules": doc.rules}))
}

pub fn list_rules(config: &Config, _params: &Value) -> Result<Value> {
    let summaries = flowkeep_engine::rules::list_rules(&config.rules_file())?;
    Ok(json!({"status": "success", "rules": summaries}))
}

pub fn toggle_rule_enabled(config: &Config, params: &Value) -> Result<Value> {
    let rule_key = require_str(params, "rule_key")?;
    let enabled: bool = require(params, "enabled")?;
    flowkeep_engine::rules::toggle_rule_enabled(&config.rules_file(), rule_key, enabled, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "rule_key": rule_key, "enabled": enabled}))
}
