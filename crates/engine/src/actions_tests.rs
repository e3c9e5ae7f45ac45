use super::*;
use crate::invoker::{InvokerResponse, ToolCatalogEntry, ToolInvoker};
use flowkeep_core::Trigger;
use serde_json::json;

struct FakeInvoker {
    response: Box<dyn Fn(&str, &str, &Value) -> InvokerResponse + Send + Sync>,
}

impl ToolInvoker for FakeInvoker {
    fn catalog(&self) -> Vec<ToolCatalogEntry> {
        vec![]
    }
    fn resolves(&self, _tool: &str) -> bool {
        false
    }
    fn invoke(&self, tool: &str, action: &str, params: &Value, _bypass: bool, _timeout: Duration) -> InvokerResponse {
        (self.response)(tool, action, params)
    }
}

fn echo_invoker() -> FakeInvoker {
    FakeInvoker {
        response: Box::new(|_tool, _action, params| InvokerResponse {
            timed_out: false,
            stdout: json!({"status": "completed", "output": params}).to_string(),
            duration: Duration::from_millis(5),
        }),
    }
}

fn timeout_invoker() -> FakeInvoker {
    FakeInvoker {
        response: Box::new(|_, _, _| InvokerResponse {
            timed_out: true,
            stdout: String::new(),
            duration: Duration::from_secs(2),
        }),
    }
}

fn error_invoker() -> FakeInvoker {
    FakeInvoker {
        response: Box::new(|_, _, _| InvokerResponse {
            timed_out: false,
            stdout: json!({"status": "error", "error": "boom"}).to_string(),
            duration: Duration::from_millis(1),
        }),
    }
}

fn leaf(tool: &str, params: Value) -> LeafAction {
    LeafAction { tool: tool.into(), action: "a".into(), params, timeout: None }
}

#[test]
fn leaf_action_resolves_params_and_parses_json_output() {
    let invoker = echo_invoker();
    let action = Action::Leaf(leaf("t", json!({"v": "{payload}"})));
    let outcome = run_action(&invoker, &action, &json!({"payload": "x"}), Duration::from_secs(1));
    match outcome {
        ActionOutcome::Completed { output, .. } => {
            assert_eq!(output["output"]["v"], "x");
        }
        other => panic!("expected completed, got {other:?}"),
    }
}

#[test]
fn leaf_action_non_json_output_is_wrapped() {
    struct RawInvoker;
    impl ToolInvoker for RawInvoker {
        fn catalog(&self) -> Vec<ToolCatalogEntry> {
            vec![]
        }
        fn resolves(&self, _tool: &str) -> bool {
            false
        }
        fn invoke(&self, _t: &str, _a: &str, _p: &Value, _b: bool, _to: Duration) -> InvokerResponse {
            InvokerResponse { timed_out: false, stdout: "not json".into(), duration: Duration::from_millis(1) }
        }
    }
    let action = Action::Leaf(leaf("t", Value::Null));
    let outcome = run_action(&RawInvoker, &action, &Value::Null, Duration::from_secs(1));
    match outcome {
        ActionOutcome::Completed { output, .. } => assert_eq!(output["output"], "not json"),
        other => panic!("expected completed, got {other:?}"),
    }
}

#[test]
fn leaf_action_timeout_surfaces_timeout_failed() {
    let invoker = timeout_invoker();
    let action = Action::Leaf(leaf("t", Value::Null));
    let outcome = run_action(&invoker, &action, &Value::Null, Duration::from_secs(1));
    assert!(matches!(outcome, ActionOutcome::TimeoutFailed { .. }));
}

#[test]
fn leaf_action_error_status_surfaces_error() {
    let invoker = error_invoker();
    let action = Action::Leaf(leaf("t", Value::Null));
    let outcome = run_action(&invoker, &action, &Value::Null, Duration::from_secs(1));
    match outcome {
        ActionOutcome::Error { message, .. } => assert_eq!(message, "boom"),
        other => panic!("expected error, got {other:?}"),
    }
}

#[test]
fn workflow_threads_previous_output_under_prev() {
    let invoker = FakeInvoker {
        response: Box::new(|_tool, _action, params| InvokerResponse {
            timed_out: false,
            stdout: json!({"status": "completed", "prev_seen": params["prev"]}).to_string(),
            duration: Duration::from_millis(1),
        }),
    };
    let steps = vec![
        Step::Leaf(leaf("t", json!({"first": true}))),
        Step::Leaf(leaf("t", json!({"prev": "{prev.prev_seen}"}))),
    ];
    let action = Action::Workflow { steps };
    let outcome = run_action(&invoker, &action, &Value::Null, Duration::from_secs(1));
    match outcome {
        ActionOutcome::Completed { output, .. } => assert_eq!(output["prev_seen"], Value::Null),
        other => panic!("expected completed, got {other:?}"),
    }
}

#[test]
fn foreach_over_empty_array_returns_zero_without_invoking() {
    struct PanicInvoker;
    impl ToolInvoker for PanicInvoker {
        fn catalog(&self) -> Vec<ToolCatalogEntry> {
            vec![]
        }
        fn resolves(&self, _tool: &str) -> bool {
            false
        }
        fn invoke(&self, _t: &str, _a: &str, _p: &Value, _b: bool, _to: Duration) -> InvokerResponse {
            panic!("must not be called for an empty foreach array");
        }
    }
    let fe = ForeachStep { array: "items".into(), steps: vec![], timeout: None };
    let action = Action::Workflow { steps: vec![Step::Foreach(fe)] };
    let outcome = run_action(&PanicInvoker, &action, &json!({"items": []}), Duration::from_secs(1));
    match outcome {
        ActionOutcome::Completed { output, .. } => {
            assert_eq!(output["processed_count"], 0);
            assert_eq!(output["results"], json!([]));
        }
        other => panic!("expected completed, got {other:?}"),
    }
}

#[test]
fn foreach_fans_out_over_array_items() {
    let invoker = FakeInvoker {
        response: Box::new(|_tool, _action, params| InvokerResponse {
            timed_out: false,
            stdout: json!({"status": "completed", "saw": params["item"]}).to_string(),
            duration: Duration::from_millis(1),
        }),
    };
    let fe = ForeachStep {
        array: "items".into(),
        steps: vec![Step::Leaf(leaf("t", json!({"item": "{item}"})))],
        timeout: None,
    };
    let action = Action::Workflow { steps: vec![Step::Foreach(fe)] };
    let outcome = run_action(&invoker, &action, &json!({"items": ["a", "b", "c"]}), Duration::from_secs(1));
    match outcome {
        ActionOutcome::Completed { output, .. } => assert_eq!(output["processed_count"], 3),
        other => panic!("expected completed, got {other:?}"),
    }
}

#[test]
fn foreach_short_circuits_whole_workflow_on_first_error() {
    let invoker = error_invoker();
    let fe = ForeachStep {
        array: "items".into(),
        steps: vec![Step::Leaf(leaf("t", Value::Null))],
        timeout: None,
    };
    let action = Action::Workflow { steps: vec![Step::Foreach(fe)] };
    let outcome = run_action(&invoker, &action, &json!({"items": [1, 2]}), Duration::from_secs(1));
    assert!(matches!(outcome, ActionOutcome::Error { .. }));
}

#[test]
fn result_label_and_trigger_file_helper_consistency() {
    let trigger = Trigger::EntryAdded { file: "f".into() };
    assert_eq!(trigger.file(), Some("f"));
    assert_eq!(ActionOutcome::Completed { output: Value::Null, duration: Duration::ZERO }.result_label(), "success");
}
