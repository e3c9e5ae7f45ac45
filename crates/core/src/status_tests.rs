use super::*;

#[test]
fn serializes_as_snake_case() {
    assert_eq!(
        serde_json::to_value(EntryStatus::TimeoutFailed).unwrap(),
        serde_json::json!("timeout_failed")
    );
    assert_eq!(
        serde_json::to_value(EntryStatus::PermanentlyFailed).unwrap(),
        serde_json::json!("permanently_failed")
    );
}

#[test]
fn round_trips_through_json() {
    let s: EntryStatus = serde_json::from_value(serde_json::json!("processing")).unwrap();
    assert_eq!(s, EntryStatus::Processing);
}

#[test]
fn blocks_entry_added_matches_spec_set() {
    assert!(EntryStatus::Processed.blocks_entry_added());
    assert!(EntryStatus::Processing.blocks_entry_added());
    assert!(EntryStatus::Failed.blocks_entry_added());
    assert!(!EntryStatus::Queued.blocks_entry_added());
    assert!(!EntryStatus::TimeoutFailed.blocks_entry_added());
}

#[test]
fn blocks_entry_updated_matches_spec_set() {
    assert!(EntryStatus::Processing.blocks_entry_updated());
    assert!(EntryStatus::Failed.blocks_entry_updated());
    assert!(!EntryStatus::Processed.blocks_entry_updated());
    assert!(!EntryStatus::Queued.blocks_entry_updated());
}

#[test]
fn is_retryable_only_for_failed_variants() {
    assert!(EntryStatus::Failed.is_retryable());
    assert!(EntryStatus::TimeoutFailed.is_retryable());
    assert!(!EntryStatus::PermanentlyFailed.is_retryable());
    assert!(!EntryStatus::Queued.is_retryable());
}

#[test]
fn display_matches_serde_form() {
    assert_eq!(EntryStatus::TimeoutFailed.to_string(), "timeout_failed");
}

#[test]
fn task_status_round_trips() {
    let s: TaskStatus = serde_json::from_value(serde_json::json!("in_progress")).unwrap();
    assert_eq!(s, TaskStatus::InProgress);
    assert_eq!(serde_json::to_value(s).unwrap(), serde_json::json!("in_progress"));
}
