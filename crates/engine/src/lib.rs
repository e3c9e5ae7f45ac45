// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowkeep-engine: the rule engine poll loop, action execution, retry/backoff, validation,
//! dry-run, and `dispatch_event` (§4.4).

pub mod actions;
mod dedup;
pub mod dispatch;
mod error;
pub mod event_types;
pub mod fuzzy;
pub mod invoker;
pub mod poll;
pub mod queue_entry;
pub mod retry;
pub mod rules;
pub mod validate;

pub use actions::{run_action, ActionOutcome};
pub use dedup::SessionDedup;
pub use dispatch::dispatch_event;
pub use error::EngineError;
pub use invoker::{InvokerResponse, ToolCatalogEntry, ToolInvoker};
pub use poll::{PollOutcome, RuleEngine};
pub use queue_entry::process_queue_entry_with_lock;
pub use retry::{retry_failed, retry_failed_entries, RetryLadderOutcome};
pub use validate::{dry_run_all_rules, dry_run_rule, validate_rule, DryRunOutcome, MatchingEntry, ResolvedAction, ValidationResult};

/// Default per-step timeout (seconds) when neither the step nor the rule names one (§4.4).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retry ladder parameters (§4.4 `retry_failed_entries`).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_BASE_SECS: u64 = 5 * 60;

/// Render an action as the short label `get_execution_history` records (`tool.action`, or
/// `workflow(N steps)` for a multi-step rule).
pub fn describe_action(action: &flowkeep_core::Action) -> String {
    match action {
        flowkeep_core::Action::Leaf(leaf) => format!("{}.{}", leaf.tool, leaf.action),
        flowkeep_core::Action::Workflow { steps } => format!("workflow({} steps)", steps.len()),
    }
}
