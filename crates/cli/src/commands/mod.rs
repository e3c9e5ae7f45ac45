// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per command-surface subsystem (§6). Every function takes the already-loaded
//! [`Config`](flowkeep_core::Config) plus the caller's `--params` JSON blob and returns a JSON
//! value to render.

pub mod dispatch;
pub mod events;
pub mod rules;
pub mod run_engine;
pub mod spawn;
pub mod tasks;
pub mod validate;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Pull a required string field out of a params object.
pub(crate) fn require_str<'a>(params: &'a Value, field: &str) -> Result<&'a str> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing required `{field}` string parameter"))
}

/// Deserialize a required field into `T`.
pub(crate) fn require<T: DeserializeOwned>(params: &Value, field: &str) -> Result<T> {
    let raw = params.get(field).ok_or_else(|| anyhow!("missing required `{field}` parameter"))?;
    serde_json::from_value(raw.clone()).with_context(|| format!("parsing `{field}` parameter"))
}

/// Deserialize an optional field into `T`, defaulting when absent.
pub(crate) fn optional<T: DeserializeOwned + Default>(params: &Value, field: &str) -> Result<T> {
    match params.get(field) {
        Some(Value::Null) | None => Ok(T::default()),
        Some(raw) => serde_json::from_value(raw.clone()).with_context(|| format!("parsing `{field}` parameter")),
    }
}
