use super::*;
use crate::invoker::{InvokerResponse, ToolCatalogEntry, ToolInvoker};
use flowkeep_core::{Action, LeafAction, PostAction};
use serial_test::serial;
use std::time::Duration as StdDuration;
use tempfile::tempdir;

struct EchoInvoker {
    calls: std::sync::Mutex<Vec<(String, String)>>,
}

impl EchoInvoker {
    fn new() -> Self {
        Self { calls: std::sync::Mutex::new(Vec::new()) }
    }
}

impl ToolInvoker for EchoInvoker {
    fn catalog(&self) -> Vec<ToolCatalogEntry> {
        vec![]
    }
    fn resolves(&self, _tool: &str) -> bool {
        false
    }
    fn invoke(&self, tool: &str, action: &str, params: &Value, _bypass: bool, _timeout: StdDuration) -> InvokerResponse {
        self.calls.lock().expect("lock").push((tool.to_string(), action.to_string()));
        InvokerResponse {
            timed_out: false,
            stdout: json!({"status": "completed", "echo": params}).to_string(),
            duration: StdDuration::from_millis(1),
        }
    }
}

fn entry_added_rule() -> Rule {
    Rule {
        enabled: true,
        trigger: Trigger::EntryAdded { file: "watched.json".to_string() },
        action: Action::Leaf(LeafAction { tool: "t".into(), action: "a".into(), params: json!({"k": "{key}"}), timeout: None }),
        post_action: None,
        condition: None,
        timeout: None,
        max_retries: None,
        retry_delay_base: None,
    }
}

fn config_in(dir: &std::path::Path) -> Config {
    std::env::set_var("FLOWKEEP_STATE_DIR", dir);
    Config::load().expect("config")
}

#[test]
#[serial]
fn entry_added_fires_once_then_is_deduped_on_next_poll() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    write_json(&config.entries_file("watched.json"), &EntriesDocument {
        entries: indexmap::indexmap! { "e1".to_string() => Entry {
            status: flowkeep_core::EntryStatus::Queued,
            updated_at: None, status_changed_at: None, retry_count: None,
            last_retry: None, next_retry: None, error: None, previous_error: None,
            extra: serde_json::Map::new(),
        }},
    }).expect("write entries");

    let mut rules = RulesDocument::default();
    rules.rules.insert("r1".to_string(), entry_added_rule());
    write_json(&config.rules_file(), &rules).expect("write rules");

    let invoker = EchoInvoker::new();
    let mut engine = RuleEngine::new(&config, &invoker, StdDuration::from_secs(1));

    let now = Utc::now();
    let first = engine.run_once(now).expect("run_once");
    assert_eq!(first.fired.len(), 1);
    assert_eq!(first.fired[0].rule_key, "r1");
    assert_eq!(first.fired[0].entry_key.as_deref(), Some("e1"));

    // Second poll: the entry is now `processed` and the snapshot has moved on, so nothing
    // should fire again even though the session dedup set would also block it.
    let second = engine.run_once(now).expect("run_once");
    assert!(second.fired.is_empty());

    let history: flowkeep_store::ExecutionHistoryDocument = read_json(&config.execution_history_file()).expect("history");
    assert_eq!(history.history.len(), 1);
}

#[test]
#[serial]
fn entry_updated_rearms_on_status_change() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    let entries_path = config.entries_file("watched.json");

    write_json(&entries_path, &EntriesDocument {
        entries: indexmap::indexmap! { "e1".to_string() => Entry {
            status: flowkeep_core::EntryStatus::Queued,
            updated_at: None, status_changed_at: None, retry_count: None,
            last_retry: None, next_retry: None, error: None, previous_error: None,
            extra: serde_json::Map::new(),
        }},
    }).expect("write entries");

    let mut rule = entry_added_rule();
    rule.trigger = Trigger::EntryUpdated { file: "watched.json".to_string() };
    let mut rules = RulesDocument::default();
    rules.rules.insert("r1".to_string(), rule);
    write_json(&config.rules_file(), &rules).expect("write rules");

    let invoker = EchoInvoker::new();
    let mut engine = RuleEngine::new(&config, &invoker, StdDuration::from_secs(1));
    let now = Utc::now();

    // First poll establishes the snapshot; an `entry_updated` trigger never fires on the very
    // first sighting of a key (there is no prior snapshot to diff against).
    let first = engine.run_once(now).expect("run_once");
    assert!(first.fired.is_empty());

    // Touch an unrelated field without changing status: entries_equal sees a diff, but the
    // trigger only fires for statuses that aren't already blocked, which `queued` is not.
    let mut doc: EntriesDocument = read_json(&entries_path).expect("read");
    doc.entries.get_mut("e1").expect("present").extra.insert("note".to_string(), json!("touched"));
    write_json(&entries_path, &doc).expect("write");

    let second = engine.run_once(now).expect("run_once");
    assert_eq!(second.fired.len(), 1);
    assert_eq!(second.fired[0].entry_key.as_deref(), Some("e1"));
}

#[test]
#[serial]
fn interval_trigger_fires_once_then_waits_out_the_window() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());

    let rule = Rule {
        enabled: true,
        trigger: Trigger::Interval { minutes: 10 },
        action: Action::Leaf(LeafAction { tool: "t".into(), action: "a".into(), params: Value::Null, timeout: None }),
        post_action: None,
        condition: None,
        timeout: None,
        max_retries: None,
        retry_delay_base: None,
    };
    let mut rules = RulesDocument::default();
    rules.rules.insert("interval_rule".to_string(), rule);
    write_json(&config.rules_file(), &rules).expect("write rules");

    let invoker = EchoInvoker::new();
    let mut engine = RuleEngine::new(&config, &invoker, StdDuration::from_secs(1));

    let t0 = Utc::now();
    let first = engine.run_once(t0).expect("run_once");
    assert_eq!(first.fired.len(), 1);

    let t1 = t0 + chrono::Duration::minutes(5);
    let second = engine.run_once(t1).expect("run_once");
    assert!(second.fired.is_empty());

    let t2 = t0 + chrono::Duration::minutes(11);
    let third = engine.run_once(t2).expect("run_once");
    assert_eq!(third.fired.len(), 1);
}

#[test]
#[serial]
fn post_action_fans_out_over_output_array() {
    let dir = tempdir().expect("tempdir");
    let config = config_in(dir.path());
    write_json(&config.entries_file("watched.json"), &EntriesDocument {
        entries: indexmap::indexmap! { "e1".to_string() => Entry {
            status: flowkeep_core::EntryStatus::Queued,
            updated_at: None, status_changed_at: None, retry_count: None,
            last_retry: None, next_retry: None, error: None, previous_error: None,
            extra: serde_json::Map::new(),
        }},
    }).expect("write entries");

    struct ArrayInvoker;
    impl ToolInvoker for ArrayInvoker {
        fn catalog(&self) -> Vec<ToolCatalogEntry> {
            vec![]
        }
        fn resolves(&self, _tool: &str) -> bool {
            false
        }
        fn invoke(&self, _t: &str, _a: &str, _p: &Value, _b: bool, _to: StdDuration) -> InvokerResponse {
            InvokerResponse {
                timed_out: false,
                stdout: json!({"status": "completed", "items": ["a", "b"]}).to_string(),
                duration: StdDuration::from_millis(1),
            }
        }
    }

    let mut rule = entry_added_rule();
    rule.post_action = Some(PostAction {
        for_each: Some("output.items".to_string()),
        condition: None,
        action: LeafAction { tool: "notify".into(), action: "send".into(), params: json!({"item": "{item}"}), timeout: None },
    });
    let mut rules = RulesDocument::default();
    rules.rules.insert("r1".to_string(), rule);
    write_json(&config.rules_file(), &rules).expect("write rules");

    let invoker = ArrayInvoker;
    let mut engine = RuleEngine::new(&config, &invoker, StdDuration::from_secs(1));
    let outcome = engine.run_once(Utc::now()).expect("run_once");
    assert_eq!(outcome.fired.len(), 1);
}
