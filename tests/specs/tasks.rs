//! Task queue round-trip and claim semantics (§8 Round-trips, scenario 5).

use serde_json::json;

use crate::prelude::harness;

#[test]
fn assign_claim_complete_round_trip() {
    let h = harness();
    let assigned = h.run("assign-task", &json!({"description": "do the thing"}));
    let task_id = assigned["task_id"].as_str().expect("task_id").to_string();

    let status = h.run("check-task-status", &json!({"task_id": task_id}));
    assert_eq!(status["task_status"], "queued");

    let claimed = h.run("process-queue", &json!({}));
    let tasks = claimed["tasks"].as_array().expect("array");
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["task_id"], task_id);

    let status = h.run("check-task-status", &json!({"task_id": task_id}));
    assert_eq!(status["task_status"], "in_progress");

    h.run(
        "log-task-completion",
        &json!({"task_id": task_id, "status": "completed", "output": {"ok": true}}),
    );

    // Task is gone from the queue...
    let status = h.run("check-task-status", &json!({"task_id": task_id}));
    // ...but its result is now reachable both via check-task-status and get-task-result.
    assert_eq!(status["task_status"], "done");
    let result = h.run("get-task-result", &json!({"task_id": task_id}));
    assert_eq!(result["status"], "success");
    assert_eq!(result["result"]["status"], "done");
    assert_eq!(result["result"]["output"]["ok"], true);
}

#[test]
fn parallel_claim_partitions_by_agent_id_with_no_double_claims() {
    let h = harness();
    let mut ids_by_agent: std::collections::HashMap<&str, Vec<String>> = std::collections::HashMap::new();
    for agent in ["a1", "a2", "a3"] {
        for i in 0..2 {
            let assigned = h.run("assign-task", &json!({"description": format!("task {i} for {agent}"), "agent_id": agent}));
            ids_by_agent.entry(agent).or_default().push(assigned["task_id"].as_str().unwrap().to_string());
        }
    }

    for agent in ["a1", "a2", "a3"] {
        let claimed = h.run("process-queue", &json!({"agent_id": agent}));
        let tasks = claimed["tasks"].as_array().expect("array");
        assert_eq!(tasks.len(), 2, "agent {agent} should claim exactly its two tasks");
        for task in tasks {
            let id = task["task_id"].as_str().unwrap();
            assert!(ids_by_agent[agent].iter().any(|i| i == id), "claimed task must belong to {agent}");
        }
    }

    // Nothing left queued: every task belonged to exactly one agent's claim.
    let recent = h.run("get-recent-tasks", &json!({"limit": 10}));
    let statuses: Vec<&str> = recent["tasks"].as_array().unwrap().iter().map(|t| t["status"].as_str().unwrap()).collect();
    assert!(statuses.iter().all(|s| *s == "in_progress"));
}

#[test]
fn cancel_task_and_update_task_on_queued_entries() {
    let h = harness();
    let assigned = h.run("assign-task", &json!({"description": "original"}));
    let task_id = assigned["task_id"].as_str().unwrap().to_string();

    let updated = h.run("update-task", &json!({"task_id": task_id, "description": "revised"}));
    assert_eq!(updated["status"], "success");

    let cancelled = h.run("cancel-task", &json!({"task_id": task_id}));
    assert_eq!(cancelled["status"], "success");

    let missing = h.run("cancel-task", &json!({"task_id": "does-not-exist"}));
    assert_eq!(missing["status"], "not_found");
}

#[test]
fn batch_assign_distributes_round_robin_across_agent_slots() {
    let h = harness();
    let descriptions: Vec<String> = (0..6).map(|i| format!("job {i}")).collect();
    let assigned = h.run(
        "batch-assign-tasks",
        &json!({"descriptions": descriptions, "agent_count": 3}),
    );
    let ids = assigned["task_ids"].as_array().expect("array");
    assert_eq!(ids.len(), 6);
}
