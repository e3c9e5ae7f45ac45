// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tool-invoker external-collaborator interface (§1 Out of scope, §4.4 Action execution).
//!
//! A concrete, process-based implementation lives in the adapters layer.

use std::time::Duration;

use serde_json::Value;

/// One tool known to the invoker's registry, for `validate_rule`'s existence/fuzzy-suggestion
/// checks.
#[derive(Debug, Clone)]
pub struct ToolCatalogEntry {
    pub tool: String,
    pub actions: Vec<String>,
}

/// The raw result of one tool invocation, before the engine interprets its stdout as JSON.
#[derive(Debug, Clone)]
pub struct InvokerResponse {
    pub timed_out: bool,
    pub stdout: String,
    pub duration: Duration,
}

/// The external-collaborator interface the engine calls through to run a `{tool, action,
/// params}` leaf action and get back a structured result or timeout.
pub trait ToolInvoker: Send + Sync {
    /// Every tool and its actions this invoker's registry knows about, for `validate_rule`.
    fn catalog(&self) -> Vec<ToolCatalogEntry>;

    /// `true` if `tool` is registered with the invoker's privileged-routing registry. The
    /// engine never inspects the registry itself -- it only asks this question and, when the
    /// answer is yes, calls [`Self::invoke`] with `bypass_enforcement = true`.
    fn resolves(&self, tool: &str) -> bool;

    /// Run `tool.action(params)` with a wall-clock `timeout`. On deadline expiry the
    /// implementation MUST terminate the child forcefully and return `timed_out = true`.
    fn invoke(&self, tool: &str, action: &str, params: &Value, bypass_enforcement: bool, timeout: Duration) -> InvokerResponse;
}
