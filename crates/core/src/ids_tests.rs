use super::*;

#[test]
fn rule_key_displays_as_inner_string() {
    let k = RuleKey::new("nightly-digest");
    assert_eq!(k.to_string(), "nightly-digest");
}

#[test]
fn task_id_equality_against_borrowed_str() {
    let id = TaskId::new("t-1");
    assert_eq!(id, "t-1");
}

#[test]
fn agent_id_from_str() {
    let a: AgentId = "agent-a".into();
    assert_eq!(a.as_str(), "agent-a");
}
