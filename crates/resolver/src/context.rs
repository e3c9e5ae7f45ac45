// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template placeholder substitution: `{path.to.value}` / `{name[index]}`.

use serde_json::{Map, Value};
use std::sync::OnceLock;

use crate::path::resolve_path;

fn full_placeholder_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"^\{([^{}]+)\}$").expect("static regex is valid"))
}

fn embedded_placeholder_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"\{([^{}]+)\}").expect("static regex is valid"))
}

/// Outcome of resolving one nested value: either a fully resolved value, or a placeholder
/// that could not be resolved, carried along with the literal text a non-droppable caller
/// (an array element, or the top-level value itself) should fall back to.
enum Resolved {
    Value(Value),
    Missing(String),
}

/// Resolve every placeholder in `value` against `context`.
///
/// - Mapping values whose entire value is a single unresolved placeholder have their key
///   dropped from the result.
/// - Sequence elements and partially-templated strings fall back to the literal placeholder
///   text on a miss rather than being dropped (there is no key to drop).
/// - Non-string scalars pass through unchanged.
pub fn resolve(value: &Value, context: &Value) -> Value {
    match resolve_inner(value, context) {
        Resolved::Value(v) => v,
        Resolved::Missing(literal) => Value::String(literal),
    }
}

fn resolve_inner(value: &Value, context: &Value) -> Resolved {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, val) in map {
                if let Resolved::Value(resolved) = resolve_inner(val, context) {
                    out.insert(key.clone(), resolved);
                }
                // Missing: full-placeholder value that didn't resolve -- drop the key.
            }
            Resolved::Value(Value::Object(out))
        }
        Value::Array(items) => {
            let resolved = items
                .iter()
                .map(|item| match resolve_inner(item, context) {
                    Resolved::Value(v) => v,
                    Resolved::Missing(literal) => Value::String(literal),
                })
                .collect();
            Resolved::Value(Value::Array(resolved))
        }
        Value::String(s) => resolve_string(s, context),
        other => Resolved::Value(other.clone()),
    }
}

fn resolve_string(s: &str, context: &Value) -> Resolved {
    if let Some(caps) = full_placeholder_re().captures(s) {
        let path = &caps[1];
        return match resolve_path(path, context) {
            Some(resolved) => Resolved::Value(resolved),
            None => Resolved::Missing(s.to_string()),
        };
    }

    if !s.contains('{') {
        return Resolved::Value(Value::String(s.to_string()));
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for caps in embedded_placeholder_re().captures_iter(s) {
        let whole = caps.get(0).expect("capture group 0 always present");
        out.push_str(&s[last..whole.start()]);
        let path = &caps[1];
        match resolve_path(path, context) {
            Some(resolved) => out.push_str(&stringify(&resolved)),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&s[last..]);
    Resolved::Value(Value::String(out))
}

/// Render a resolved JSON value the way an embedded-in-text substitution needs it: plain text
/// for strings, compact JSON for everything else.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
