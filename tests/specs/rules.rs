//! Rule CRUD round-trips and the `list_rules`/`get_rules` split (§8 Round-trips, §1b).

use serde_json::json;

use crate::prelude::harness;

#[test]
fn add_rule_then_get_rule_returns_identical_body() {
    let h = harness();
    let rule = json!({
        "trigger": {"type": "entry_added", "file": "watched.json"},
        "action": {"tool": "notify", "action": "send", "params": {"v": "{payload}"}},
    });

    h.run("add-rule", &json!({"rule_key": "r1", "rule": rule}));

    let got = h.run("get-rule", &json!({"rule_key": "r1"}));
    assert_eq!(got["status"], "success");
    assert_eq!(got["rule"]["trigger"]["type"], "entry_added");
    assert_eq!(got["rule"]["trigger"]["file"], "watched.json");
    assert_eq!(got["rule"]["action"]["tool"], "notify");
    assert_eq!(got["rule"]["enabled"], true);
}

#[test]
fn list_rules_summarizes_without_action_body() {
    let h = harness();
    h.run(
        "add-rule",
        &json!({
            "rule_key": "r1",
            "rule": {
                "trigger": {"type": "entry_added", "file": "watched.json"},
                "action": {"tool": "notify", "action": "send", "params": {}},
                "condition": "new_entry.status == \"queued\"",
            },
        }),
    );

    let listed = h.run("list-rules", &json!({}));
    let rules = listed["rules"].as_array().expect("array");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0]["rule_key"], "r1");
    assert_eq!(rules[0]["trigger_type"], "entry_added");
    assert_eq!(rules[0]["trigger_file"], "watched.json");
    assert_eq!(rules[0]["has_condition"], true);
    assert!(rules[0].get("action").is_none(), "list_rules must omit the action body");

    let full = h.run("get-rules", &json!({}));
    assert!(full["rules"]["r1"].get("action").is_some(), "get_rules must include the full body");
}

#[test]
fn toggle_rule_enabled_flips_the_flag() {
    let h = harness();
    h.run(
        "add-rule",
        &json!({
            "rule_key": "r1",
            "rule": {"trigger": {"type": "interval", "minutes": 5}, "action": {"tool": "t", "action": "a", "params": {}}},
        }),
    );

    h.run("toggle-rule-enabled", &json!({"rule_key": "r1", "enabled": false}));
    let got = h.run("get-rule", &json!({"rule_key": "r1"}));
    assert_eq!(got["rule"]["enabled"], false);
}

#[test]
fn delete_rule_removes_it() {
    let h = harness();
    h.run(
        "add-rule",
        &json!({
            "rule_key": "r1",
            "rule": {"trigger": {"type": "interval", "minutes": 5}, "action": {"tool": "t", "action": "a", "params": {}}},
        }),
    );
    let deleted = h.run("delete-rule", &json!({"rule_key": "r1"}));
    assert_eq!(deleted["removed"], true);

    let listed = h.run("list-rules", &json!({}));
    assert!(listed["rules"].as_array().expect("array").is_empty());
}
