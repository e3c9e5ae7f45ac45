// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowkeep-supervisor: the task queue and bounded worker-process dispatch system.

mod error;
mod queue;
mod results;
mod spawn;

pub use error::SupervisorError;
pub use queue::{assign_task, batch_assign_tasks, cancel_task, claim, mark_in_progress, update_task, TaskUpdate};
pub use results::{get_all_results, get_recent_tasks, get_task_result, log_task_completion, RecentTask};
pub use spawn::{execute_queue, kill_agents, ExecuteQueueOutcome, KillReport, WorkerSpawner, NESTING_GUARD_ENV};

/// Hard cap on concurrent worker processes.
pub const MAX_PARALLEL_AGENTS: usize = 3;
