//! `dispatch_event`: out-of-band event triggers bypass polling entirely (§1b, §4.4 step 7).

use serde_json::json;

use crate::prelude::{fixed_output_registry, harness};

#[test]
fn dispatch_event_fires_matching_enabled_rules_and_skips_others() {
    let h = harness();
    h.write_tools(&fixed_output_registry("notifier", r#"{"status":"completed"}"#));

    h.run(
        "add-rule",
        &json!({
            "rule_key": "on_deploy",
            "rule": {
                "trigger": {"type": "event", "event_key": "deploy.finished"},
                "action": {"tool": "notifier", "action": "run", "params": {"ref": "{sha}"}},
            },
        }),
    );
    h.run(
        "add-rule",
        &json!({
            "rule_key": "on_rollback",
            "rule": {
                "trigger": {"type": "event", "event_key": "deploy.rolled_back"},
                "action": {"tool": "notifier", "action": "run", "params": {}},
            },
        }),
    );
    h.run("toggle-rule-enabled", &json!({"rule_key": "on_rollback", "enabled": false}));

    let result = h.run("dispatch-event", &json!({"event_key": "deploy.finished", "payload": {"sha": "abc123"}}));
    assert_eq!(result["status"], "success");
    let fired = result["fired"].as_array().expect("array");
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0]["rule_key"], "on_deploy");
    assert_eq!(fired[0]["result"], "success");

    let history = h.run("get-execution-history", &json!({}));
    let records = history["records"].as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["trigger"], "event");
    assert_eq!(records[0]["rule_id"], "on_deploy");
}

#[test]
fn dispatch_event_with_no_matching_rule_fires_nothing() {
    let h = harness();
    let result = h.run("dispatch-event", &json!({"event_key": "nothing.subscribed", "payload": {}}));
    assert!(result["fired"].as_array().expect("array").is_empty());
}

#[test]
fn add_and_get_event_types_round_trip() {
    let h = harness();
    h.run(
        "add-event-type",
        &json!({"event_key": "deploy.finished", "event_type": {"test": "payload.ok == true"}}),
    );
    let listed = h.run("get-event-types", &json!({}));
    let types = listed["event_types"].as_object().expect("object");
    assert!(types.contains_key("deploy.finished"));
    assert_eq!(types["deploy.finished"]["test"], "payload.ok == true");
}

#[test]
fn execution_history_filters_by_status_and_limit() {
    let h = harness();
    h.write_tools(&fixed_output_registry("notifier", r#"{"status":"completed"}"#));
    h.run(
        "add-rule",
        &json!({
            "rule_key": "r1",
            "rule": {"trigger": {"type": "event", "event_key": "e1"}, "action": {"tool": "notifier", "action": "run", "params": {}}},
        }),
    );
    for _ in 0..3 {
        h.run("dispatch-event", &json!({"event_key": "e1", "payload": {}}));
    }

    let history = h.run("get-execution-history", &json!({"status": "success", "limit": 2}));
    assert_eq!(history["returned_count"], 2);
    assert_eq!(history["total_count"], 3);
}
