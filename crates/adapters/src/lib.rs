// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Process-based adapters for the engine's [`ToolInvoker`](flowkeep_engine::ToolInvoker) and
//! the supervisor's [`WorkerSpawner`](flowkeep_supervisor::WorkerSpawner) -- the two external
//! collaborators the core library never implements itself.

pub mod subprocess;
pub mod tool_invoker;
pub mod worker_spawner;

pub use subprocess::run_with_timeout;
pub use tool_invoker::{ProcessToolInvoker, ToolDefinition, ToolRegistry};
pub use worker_spawner::ProcessWorkerSpawner;
