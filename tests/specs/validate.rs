//! `validate_rule`'s fuzzy tool/action suggestion (§4.4, Ratcliff-Obershelp threshold 0.6).

use serde_json::json;

use crate::prelude::harness;

#[test]
fn validate_rule_flags_unknown_tool_with_fuzzy_suggestion() {
    let h = harness();
    h.write_tools(&json!({
        "notifier": {"command": ["/bin/true"], "actions": ["send", "broadcast"], "trusted": true},
    }));

    let rule = json!({
        "trigger": {"type": "entry_added", "file": "watched.json"},
        "action": {"tool": "notifer", "action": "send", "params": {}},
    });
    let result = h.run("validate-rule", &json!({"rule": rule}));
    assert_eq!(result["valid"], false);
    let errors = result["errors"].as_array().expect("array");
    assert_eq!(errors.len(), 1);
    let message = errors[0].as_str().expect("string");
    assert!(message.contains("unknown tool `notifer`"), "message was: {message}");
    assert!(message.contains("did you mean `notifier`?"), "message was: {message}");
}

#[test]
fn validate_rule_flags_unknown_action_with_fuzzy_suggestion() {
    let h = harness();
    h.write_tools(&json!({
        "notifier": {"command": ["/bin/true"], "actions": ["send", "broadcast"], "trusted": true},
    }));

    let rule = json!({
        "trigger": {"type": "interval", "minutes": 5},
        "action": {"tool": "notifier", "action": "sned", "params": {}},
    });
    let result = h.run("validate-rule", &json!({"rule": rule}));
    assert_eq!(result["valid"], false);
    let message = result["errors"][0].as_str().expect("string");
    assert!(message.contains("unknown action `sned` for tool `notifier`"), "message was: {message}");
    assert!(message.contains("did you mean `send`?"), "message was: {message}");
}

#[test]
fn validate_rule_passes_a_well_formed_rule() {
    let h = harness();
    h.write_tools(&json!({
        "notifier": {"command": ["/bin/true"], "actions": ["send"], "trusted": true},
    }));

    let rule = json!({
        "trigger": {"type": "entry_added", "file": "watched.json"},
        "action": {"tool": "notifier", "action": "send", "params": {}},
    });
    let result = h.run("validate-rule", &json!({"rule": rule}));
    assert_eq!(result["valid"], true);
    assert!(result["errors"].as_array().expect("array").is_empty());
}

#[test]
fn validate_rule_rejects_empty_trigger_file() {
    let h = harness();
    let rule = json!({
        "trigger": {"type": "entry_added", "file": ""},
        "action": {"tool": "anything", "action": "run", "params": {}},
    });
    let result = h.run("validate-rule", &json!({"rule": rule}));
    assert_eq!(result["valid"], false);
    let message = result["errors"][0].as_str().expect("string");
    assert!(message.contains("non-empty `file`"), "message was: {message}");
}
