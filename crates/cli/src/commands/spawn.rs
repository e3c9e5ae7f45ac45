// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `execute_queue`, `kill_agents`.

use anyhow::Result;
use flowkeep_adapters::ProcessWorkerSpawner;
use flowkeep_core::Config;
use serde_json::{json, Value};

pub fn execute_queue(config: &Config, parallel: usize, agent_id: Option<&str>) -> Result<Value> {
    let spawner = ProcessWorkerSpawner::new(std::env::current_exe()?);
    let outcome = flowkeep_supervisor::execute_queue(
        &spawner,
        &config.task_queue_file(),
        &config.supervisor_lock_file(),
        &config.state_dir.join("agents"),
        parallel,
        agent_id,
        chrono::Utc::now(),
        flowkeep_lock::DEFAULT_TIMEOUT,
    )?;
    Ok(json!({"status": "success", "outcome": outcome}))
}

pub fn kill_agents(config: &Config, _params: &Value) -> Result<Value> {
    let report = flowkeep_supervisor::kill_agents(&config.supervisor_lock_file());
    Ok(json!({"status": "success", "report": report}))
}
