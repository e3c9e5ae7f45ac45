// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dotted-path / bracket-index traversal shared by the context resolver and the predicate
//! evaluator's variable lookups.
//!
//! Grammar: `path := segment ('.' segment)*`, `segment := name ('[' digit+ ']')*`.

use serde_json::Value;
use std::sync::OnceLock;

fn segment_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)((?:\[\d+\])*)$")
            .expect("static regex is valid")
    })
}

fn index_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\[(\d+)\]").expect("static regex is valid"))
}

/// Resolve a dotted/bracketed path against `root`, returning `None` if any segment, field, or
/// index is missing.
pub fn resolve_path(path: &str, root: &Value) -> Option<Value> {
    let mut current = root.clone();
    for raw_segment in path.split('.') {
        let caps = segment_re().captures(raw_segment)?;
        let name = &caps[1];
        let indices = &caps[2];

        current = current.as_object()?.get(name)?.clone();

        for idx_cap in index_re().captures_iter(indices) {
            let idx: usize = idx_cap[1].parse().ok()?;
            current = current.as_array()?.get(idx)?.clone();
        }
    }
    Some(current)
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
