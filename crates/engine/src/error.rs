// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for the rule engine (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("lock error: {0}")]
    Lock(#[from] flowkeep_lock::LockError),
    #[error("store error: {0}")]
    Store(#[from] flowkeep_store::StoreError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),
}
