use super::*;
use serde_json::json;

#[test]
fn full_placeholder_resolves_to_typed_value() {
    let ctx = json!({"count": 5});
    let out = resolve(&json!({"v": "{count}"}), &ctx);
    assert_eq!(out, json!({"v": 5}));
}

#[test]
fn full_placeholder_miss_drops_the_key() {
    let ctx = json!({"payload": "x"});
    let out = resolve(&json!({"v": "{missing}", "kept": "{payload}"}), &ctx);
    assert_eq!(out, json!({"kept": "x"}));
}

#[test]
fn partial_placeholder_substitutes_in_place() {
    let ctx = json!({"name": "Ann"});
    let out = resolve(&json!({"greeting": "hello {name}!"}), &ctx);
    assert_eq!(out, json!({"greeting": "hello Ann!"}));
}

#[test]
fn partial_placeholder_miss_leaves_literal() {
    let ctx = json!({});
    let out = resolve(&json!({"greeting": "hello {name}!"}), &ctx);
    assert_eq!(out, json!({"greeting": "hello {name}!"}));
}

#[test]
fn nested_sequence_resolves_each_element() {
    let ctx = json!({"a": 1, "b": 2});
    let out = resolve(&json!({"vals": ["{a}", "{b}", "{missing}"]}), &ctx);
    assert_eq!(out, json!({"vals": [1, 2, "{missing}"]}));
}

#[test]
fn bracket_index_in_placeholder() {
    let ctx = json!({"participants": [{"name": "Ann"}, {"name": "Bo"}]});
    let out = resolve(&json!({"v": "{participants[1].name}"}), &ctx);
    assert_eq!(out, json!({"v": "Bo"}));
}

#[test]
fn scalar_non_string_passes_through() {
    let ctx = json!({});
    let out = resolve(&json!({"n": 42, "b": true, "z": null}), &ctx);
    assert_eq!(out, json!({"n": 42, "b": true, "z": null}));
}

#[test]
fn nested_mapping_drops_only_the_missing_key() {
    let ctx = json!({"payload": "x"});
    let out = resolve(
        &json!({"outer": {"v": "{payload}", "missing": "{nope}"}}),
        &ctx,
    );
    assert_eq!(out, json!({"outer": {"v": "x"}}));
}
