// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task queue CRUD, claim (`process_queue`), and completion logging (§4.5).

use anyhow::Result;
use flowkeep_core::{Config, UuidIdGen};
use flowkeep_store::TaskQueueDocument;
use flowkeep_supervisor::TaskUpdate;
use serde_json::{json, Value};

use super::{optional, require, require_str};

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn assign_task(config: &Config, params: &Value) -> Result<Value> {
    let description: String = require(params, "description")?;
    let context: Value = optional(params, "context")?;
    let priority = params.get("priority").and_then(Value::as_i64);
    let batch_id = params.get("batch_id").and_then(Value::as_str).map(str::to_string);
    let agent_id = params.get("agent_id").and_then(Value::as_str).map(str::to_string);

    let task_id = flowkeep_supervisor::assign_task(
        &config.task_queue_file(),
        &UuidIdGen,
        description,
        context,
        priority,
        batch_id,
        agent_id,
        &now_iso(),
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    Ok(json!({"status": "success", "task_id": task_id.as_str()}))
}

pub fn batch_assign_tasks(config: &Config, params: &Value) -> Result<Value> {
    let descriptions: Vec<String> = require(params, "descriptions")?;
    let context: Value = optional(params, "context")?;
    let priority = params.get("priority").and_then(Value::as_i64);
    let batch_id = params.get("batch_id").and_then(Value::as_str).map(str::to_string);
    let agent_count = params.get("agent_count").and_then(Value::as_u64).unwrap_or(1) as usize;

    let ids = flowkeep_supervisor::batch_assign_tasks(
        &config.task_queue_file(),
        &UuidIdGen,
        descriptions,
        context,
        priority,
        batch_id,
        agent_count,
        &now_iso(),
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();
    Ok(json!({"status": "success", "task_ids": ids}))
}

pub fn cancel_task(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    let found = flowkeep_supervisor::cancel_task(&config.task_queue_file(), task_id, &now_iso(), flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": if found { "success" } else { "not_found" }}))
}

pub fn update_task(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    let update = TaskUpdate {
        description: params.get("description").and_then(Value::as_str).map(str::to_string),
        context: params.get("context").cloned(),
        priority: params.get("priority").map(|v| v.as_i64()),
        agent_id: params.get("agent_id").map(|v| v.as_str().map(str::to_string)),
    };
    let found = flowkeep_supervisor::update_task(&config.task_queue_file(), task_id, update, flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": if found { "success" } else { "not_found" }}))
}

pub fn check_task_status(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    let queue: TaskQueueDocument = flowkeep_store::read_json(&config.task_queue_file())?;
    if let Some(task) = queue.tasks.get(task_id) {
        return Ok(json!({"status": "success", "task_status": task.status}));
    }
    if let Some(result) = flowkeep_supervisor::get_task_result(&config.task_results_file(), task_id)? {
        return Ok(json!({"status": "success", "task_status": result.status}));
    }
    Ok(json!({"status": "not_found"}))
}

pub fn get_task_result(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    match flowkeep_supervisor::get_task_result(&config.task_results_file(), task_id)? {
        Some(result) => Ok(json!({"status": "success", "result": result})),
        None => Ok(json!({"status": "not_found"})),
    }
}

pub fn get_all_results(config: &Config, _params: &Value) -> Result<Value> {
    let results = flowkeep_supervisor::get_all_results(&config.task_results_file())?;
    Ok(json!({"status": "success", "results": results}))
}

pub fn get_recent_tasks(config: &Config, params: &Value) -> Result<Value> {
    let limit = params.get("limit").and_then(Value::as_u64).unwrap_or(20) as usize;
    let recent = flowkeep_supervisor::get_recent_tasks(&config.task_queue_file(), &config.task_results_file(), limit)?;
    Ok(json!({"status": "success", "tasks": recent}))
}

pub fn process_queue(config: &Config, params: &Value) -> Result<Value> {
    let agent_id = params.get("agent_id").and_then(Value::as_str);
    let claimed = flowkeep_supervisor::claim(&config.task_queue_file(), agent_id, &now_iso(), flowkeep_lock::DEFAULT_TIMEOUT)?;
    let tasks: Vec<Value> = claimed
        .into_iter()
        .map(|(id, task)| json!({"task_id": id.as_str(), "description": task.description, "context": task.context}))
        .collect();
    Ok(json!({"status": "success", "tasks": tasks}))
}

pub fn mark_task_in_progress(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    let found = flowkeep_supervisor::mark_in_progress(&config.task_queue_file(), task_id, &now_iso(), flowkeep_lock::DEFAULT_TIMEOUT)?;
    Ok(json!({"status": if found { "success" } else { "not_found" }}))
}

pub fn log_task_completion(config: &Config, params: &Value) -> Result<Value> {
    let task_id = require_str(params, "task_id")?;
    let raw_status = require_str(params, "status")?;
    let actions_taken: Value = optional(params, "actions_taken")?;
    let output: Value = optional(params, "output")?;
    let now = now_iso();

    let result = flowkeep_supervisor::log_task_completion(
        &config.task_queue_file(),
        &config.task_results_file(),
        &config.results_archive_file(),
        &config.results_dir(),
        Some(&config.token_sidecar_file(task_id)),
        task_id,
        raw_status,
        actions_taken,
        output,
        &now,
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    Ok(json!({"status": "success", "result": result}))
}

