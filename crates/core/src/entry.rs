// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry documents tracked inside a file-backed trigger's `entries` map.

use crate::EntryStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry. Engine-owned fields are typed; everything else an external writer attaches
/// (the payload a rule's action will interpolate) is carried verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub status: EntryStatus,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub status_changed_at: Option<String>,
    #[serde(default)]
    pub retry_count: Option<u32>,
    #[serde(default)]
    pub last_retry: Option<String>,
    #[serde(default)]
    pub next_retry: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub previous_error: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Render this entry as a flat JSON object, the shape the context resolver and the
    /// predicate evaluator both operate on.
    pub fn to_context(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Object(self.extra.clone()))
    }
}

/// Document wrapper for a file-backed entries collection: `{"entries": {key: entry}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntriesDocument {
    #[serde(default)]
    pub entries: indexmap::IndexMap<String, Entry>,
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
