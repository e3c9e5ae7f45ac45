// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `add_event_type`, `update_event_type`, `get_event_types`.

use anyhow::Result;
use flowkeep_core::Config;
use serde_json::{json, Value};

use super::require;

pub fn add_event_type(config: &Config, params: &Value) -> Result<Value> {
    let event_key: String = require(params, "event_key")?;
    let event_type = require(params, "event_type")?;
    flowkeep_engine::event_types::add_event_type(&config.event_types_file(), &event_key, event_type, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "event_key": event_key}))
}

pub fn update_event_type(config: &Config, params: &Value) -> Result<Value> {
    let event_key: String = require(params, "event_key")?;
    let event_type = require(params, "event_type")?;
    flowkeep_engine::event_types::update_event_type(
        &config.event_types_file(),
        &event_key,
        event_type,
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    Ok(json!({"status": "success", "event_key": event_key}))
}

pub fn get_event_types(config: &Config, _params: &Value) -> Result<Value> {
    let doc = flowkeep_engine::event_types::get_event_types(&config.event_types_file())?;
    Ok(json!({"status": "success", "event_types": doc}))
}
