// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dispatch_event`, `retry_failed`, `retry_failed_entries`, `get_execution_history`.

use anyhow::Result;
use flowkeep_adapters::ProcessToolInvoker;
use flowkeep_core::Config;
use flowkeep_store::HistoryQuery;
use serde_json::{json, Value};

use super::{optional, require, require_str};

pub fn dispatch_event(config: &Config, params: &Value) -> Result<Value> {
    let event_key = require_str(params, "event_key")?;
    let payload: Value = optional(params, "payload")?;
    let invoker = ProcessToolInvoker::load(&config.tools_file())?;

    let fired = flowkeep_engine::dispatch_event(
        &config.rules_file(),
        &config.execution_history_file(),
        event_key,
        &payload,
        &invoker,
        chrono::Utc::now(),
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;

    let fired: Vec<Value> = fired
        .into_iter()
        .map(|d| json!({"rule_key": d.rule_key, "result": d.outcome.result_label()}))
        .collect();
    Ok(json!({"status": "success", "fired": fired}))
}

pub fn retry_failed(config: &Config, params: &Value) -> Result<Value> {
    let file = require_str(params, "file")?;
    let reset = flowkeep_engine::retry_failed(&config.entries_file(file), chrono::Utc::now(), flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": "success", "reset": reset}))
}

pub fn retry_failed_entries(config: &Config, params: &Value) -> Result<Value> {
    let file = require_str(params, "file")?;
    let max_retries: u32 = optional(params, "max_retries")?;
    let max_retries = if max_retries == 0 { flowkeep_engine::DEFAULT_MAX_RETRIES } else { max_retries };
    let base_secs: u64 = optional(params, "retry_delay_base_secs")?;
    let base_secs = if base_secs == 0 { flowkeep_engine::DEFAULT_RETRY_BASE_SECS } else { base_secs };

    let outcome = flowkeep_engine::retry_failed_entries(
        &config.entries_file(file),
        max_retries,
        std::time::Duration::from_secs(base_secs),
        chrono::Utc::now(),
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    Ok(json!({"status": "success", "outcome": outcome}))
}

pub fn get_execution_history(config: &Config, params: &Value) -> Result<Value> {
    let query = HistoryQuery {
        rule_id: params.get("rule_id").and_then(Value::as_str).map(str::to_string),
        since: params.get("since").and_then(Value::as_str).map(str::to_string),
        status: params.get("status").and_then(Value::as_str).map(str::to_string),
        limit: params.get("limit").and_then(Value::as_u64).map(|n| n as usize),
    };
    let result = flowkeep_store::query_history(&config.execution_history_file(), &query)?;
    Ok(json!({"status": "success", "records": result.records, "total_count": result.total_count, "returned_count": result.returned_count}))
}
