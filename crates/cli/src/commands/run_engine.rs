// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `run_engine`: the long-running poll loop. Blocks for the lifetime of the process.

use std::time::Duration;

use anyhow::Result;
use flowkeep_adapters::ProcessToolInvoker;
use flowkeep_core::Config;
use flowkeep_engine::RuleEngine;

/// Poll `RuleEngine::run_once` every `interval` until interrupted (or, in tests, until
/// `iterations` passes have run).
pub fn run_engine(config: &Config, interval: Duration, iterations: Option<u64>) -> Result<()> {
    let invoker = ProcessToolInvoker::load(&config.tools_file())?;
    let mut engine = RuleEngine::new(config, &invoker, flowkeep_lock::DEFAULT_TIMEOUT);

    let mut pass = 0u64;
    loop {
        let outcome = engine.run_once(chrono::Utc::now())?;
        for fired in &outcome.fired {
            tracing::info!(rule = %fired.rule_key, entry = ?fired.entry_key, result = %fired.result, "rule fired");
        }

        pass += 1;
        if iterations.is_some_and(|limit| pass >= limit) {
            return Ok(());
        }
        std::thread::sleep(interval);
    }
}
