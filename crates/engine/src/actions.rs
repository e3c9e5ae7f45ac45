// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action execution: leaf invocation, multi-step workflows, and `foreach` fan-out (§4.4).

use std::time::Duration;

use flowkeep_core::{Action, ForeachStep, LeafAction, Step};
use serde_json::{json, Map, Value};

use crate::invoker::ToolInvoker;

/// The terminal outcome of running one action (leaf, workflow, or `foreach`).
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Completed { output: Value, duration: Duration },
    Error { message: String, duration: Duration },
    TimeoutFailed { duration: Duration },
}

impl ActionOutcome {
    pub fn duration(&self) -> Duration {
        match self {
            ActionOutcome::Completed { duration, .. } => *duration,
            ActionOutcome::Error { duration, .. } => *duration,
            ActionOutcome::TimeoutFailed { duration } => *duration,
        }
    }

    /// The `result` string this outcome maps to in an ExecutionHistory record.
    pub fn result_label(&self) -> &'static str {
        match self {
            ActionOutcome::Completed { .. } => "success",
            ActionOutcome::Error { .. } => "failed",
            ActionOutcome::TimeoutFailed { .. } => "timeout_failed",
        }
    }
}

/// Run a rule's primary `action` (either a single leaf invocation or an ordered workflow)
/// against `context`, using `default_timeout` for any step lacking its own.
pub fn run_action(invoker: &dyn ToolInvoker, action: &Action, context: &Value, default_timeout: Duration) -> ActionOutcome {
    match action {
        Action::Leaf(leaf) => run_leaf(invoker, leaf, context, default_timeout),
        Action::Workflow { steps } => run_steps(invoker, steps, context, default_timeout),
    }
}

/// Run an ordered sequence of steps, threading `previous_output` under `prev` in each step's
/// context, terminating on the first non-`Completed` outcome.
fn run_steps(invoker: &dyn ToolInvoker, steps: &[Step], context: &Value, default_timeout: Duration) -> ActionOutcome {
    let mut ctx = context.clone();
    let mut total = Duration::ZERO;
    let mut last_output = Value::Null;
    for step in steps {
        set_field(&mut ctx, "prev", last_output.clone());
        let outcome = run_step(invoker, step, &ctx, default_timeout);
        total += outcome.duration();
        match outcome {
            ActionOutcome::Completed { output, .. } => last_output = output,
            other => return with_total_duration(other, total),
        }
    }
    ActionOutcome::Completed { output: last_output, duration: total }
}

fn with_total_duration(outcome: ActionOutcome, total: Duration) -> ActionOutcome {
    match outcome {
        ActionOutcome::Completed { output, .. } => ActionOutcome::Completed { output, duration: total },
        ActionOutcome::Error { message, .. } => ActionOutcome::Error { message, duration: total },
        ActionOutcome::TimeoutFailed { .. } => ActionOutcome::TimeoutFailed { duration: total },
    }
}

fn run_step(invoker: &dyn ToolInvoker, step: &Step, context: &Value, default_timeout: Duration) -> ActionOutcome {
    match step {
        Step::Leaf(leaf) => run_leaf(invoker, leaf, context, default_timeout),
        Step::Foreach(fe) => run_foreach(invoker, fe, context, default_timeout),
    }
}

fn run_leaf(invoker: &dyn ToolInvoker, leaf: &LeafAction, context: &Value, default_timeout: Duration) -> ActionOutcome {
    let params = flowkeep_resolver::resolve(&leaf.params, context);
    let timeout = leaf.timeout.map(Duration::from_secs).unwrap_or(default_timeout);
    let bypass = invoker.resolves(&leaf.tool);
    let response = invoker.invoke(&leaf.tool, &leaf.action, &params, bypass, timeout);

    if response.timed_out {
        return ActionOutcome::TimeoutFailed { duration: response.duration };
    }

    let parsed: Value = match serde_json::from_str(&response.stdout) {
        Ok(v) => v,
        Err(_) => {
            return ActionOutcome::Completed {
                output: json!({"status": "completed", "output": response.stdout}),
                duration: response.duration,
            }
        }
    };

    match parsed.get("status").and_then(Value::as_str) {
        Some("error") => ActionOutcome::Error {
            message: parsed.get("error").and_then(Value::as_str).unwrap_or("tool reported an error").to_string(),
            duration: response.duration,
        },
        Some("timeout_failed") => ActionOutcome::TimeoutFailed { duration: response.duration },
        _ => ActionOutcome::Completed { output: parsed, duration: response.duration },
    }
}

/// `{type: foreach, array, steps}`: resolve the array/mapping at `array` from `context`, run
/// `steps` once per item, and fail the whole fan-out on the first error/timeout. An item may
/// come from a JSON array (exposed as `item`/`index`) or a JSON object (exposed as
/// `item`/`item_key`).
fn run_foreach(invoker: &dyn ToolInvoker, fe: &ForeachStep, context: &Value, default_timeout: Duration) -> ActionOutcome {
    let timeout = fe.timeout.map(Duration::from_secs).unwrap_or(default_timeout);
    let resolved = flowkeep_resolver::resolve_path(&fe.array, context);

    let items: Vec<(Option<String>, Value)> = match resolved {
        Some(Value::Array(items)) => items.into_iter().map(|v| (None, v)).collect(),
        Some(Value::Object(map)) => map.into_iter().map(|(k, v)| (Some(k), v)).collect(),
        _ => Vec::new(),
    };

    let mut results = Vec::with_capacity(items.len());
    let mut total = Duration::ZERO;
    for (index, (item_key, item)) in items.into_iter().enumerate() {
        let mut item_ctx = context.clone();
        set_field(&mut item_ctx, "item", item);
        set_field(&mut item_ctx, "index", json!(index));
        if let Some(key) = &item_key {
            set_field(&mut item_ctx, "item_key", json!(key));
        }
        let outcome = run_steps(invoker, &fe.steps, &item_ctx, timeout);
        total += outcome.duration();
        match outcome {
            ActionOutcome::Completed { output, .. } => results.push(output),
            other => return with_total_duration(other, total),
        }
    }

    ActionOutcome::Completed {
        output: json!({"results": results, "processed_count": results.len()}),
        duration: total,
    }
}

fn set_field(context: &mut Value, key: &str, value: Value) {
    if !context.is_object() {
        *context = Value::Object(Map::new());
    }
    if let Value::Object(map) = context {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
