// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Exclusive, advisory, per-file locking with bounded acquisition timeout and
//! stale-lock reclamation for pid-owned lockfiles.
//!
//! [`acquire`] is the workhorse: every state-store mutation is framed by a lock rooted at
//! `<path>.lock`. [`stale`] backs the agent supervisor's own long-lived lockfile, which in
//! addition to mutual exclusion carries JSON metadata (`created_at`, `pids`) used to decide
//! whether a previous holder crashed without cleaning up.

mod handle;
mod stale;

pub use handle::{acquire, lock_path_for, LockError, LockHandle};
pub use stale::{is_pid_alive, LockMeta};

/// Default acquisition timeout used by callers that do not have a more specific deadline.
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Interval between acquisition attempts while contended.
pub const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Age after which the supervisor lockfile is considered stale regardless of pid liveness.
pub const STALE_AGE: std::time::Duration = std::time::Duration::from_secs(30 * 60);
