use super::*;
use tempfile::tempdir;

#[test]
fn spawn_launches_the_worker_command_and_returns_its_pid() {
    let dir = tempdir().expect("tempdir");
    let log_path = dir.path().join("worker.log");

    let spawner = ProcessWorkerSpawner::new(PathBuf::from("/bin/sh"));
    let pid = spawner.spawn(None, 3, &log_path).expect("spawn");
    assert!(pid > 0);
    assert!(log_path.exists());
}

#[test]
fn spawn_passes_the_agent_id_when_given() {
    let dir = tempdir().expect("tempdir");
    let log_path = dir.path().join("agent-1.log");

    // /bin/sh with no script just exits immediately reading from stdin (null), which is enough
    // to confirm the call succeeds with an `--agent` argument present.
    let spawner = ProcessWorkerSpawner::new(PathBuf::from("/bin/sh"));
    let pid = spawner.spawn(Some("agent-1"), 1, &log_path).expect("spawn");
    assert!(pid > 0);
}
