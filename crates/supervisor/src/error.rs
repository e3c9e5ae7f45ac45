// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the task queue and worker-spawning subsystem.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Store(#[from] flowkeep_store::StoreError),
    #[error(transparent)]
    Lock(#[from] flowkeep_lock::LockError),
    #[error("no such task: {0}")]
    NotFound(String),
    #[error("a supervisor is already running: {0} live worker(s)")]
    AlreadyRunning(usize),
    #[error("execute_queue called from inside a worker process")]
    NestedSpawn,
    #[error("failed to spawn worker: {0}")]
    Spawn(#[source] std::io::Error),
}
