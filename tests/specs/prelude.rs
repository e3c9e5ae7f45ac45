//! Test helpers for flowkeep's behavioral specifications.
//!
//! Black-box: every test shells out to the `flowkeep` binary against an isolated
//! `FLOWKEEP_STATE_DIR` and asserts on stdout/exit code, mirroring how an external caller
//! (a shell script, a cron entry, a human at a terminal) actually drives this tool.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use assert_cmd::cargo::CommandCargoExt;
use serde_json::Value;

/// An isolated state directory plus a fluent command builder bound to it.
pub struct Harness {
    state_dir: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self { state_dir: tempfile::tempdir().expect("tempdir") }
    }

    pub fn state_path(&self) -> &Path {
        self.state_dir.path()
    }

    /// Write a JSON-serializable registry to `tools.json` so `validate_rule`/action dispatch
    /// has something to resolve against.
    pub fn write_tools(&self, tools: &Value) {
        std::fs::write(self.state_path().join("tools.json"), serde_json::to_vec(tools).expect("serialize")).expect("write tools.json");
    }

    /// Write an entries file for a file-backed trigger under `entries/<name>`.
    pub fn write_entries(&self, name: &str, body: &Value) {
        let path = self.state_path().join("entries").join(name);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, serde_json::to_vec(body).expect("serialize")).expect("write entries");
    }

    pub fn read_entries(&self, name: &str) -> Value {
        let path = self.state_path().join("entries").join(name);
        let bytes = std::fs::read(path).expect("read entries");
        serde_json::from_slice(&bytes).expect("parse entries")
    }

    /// Run a `flowkeep` subcommand with a `--params <json>` blob and parse stdout as JSON.
    pub fn run(&self, subcommand: &str, params: &Value) -> Value {
        let output = self.command(subcommand, params).output().expect("spawn flowkeep");
        assert!(
            output.status.success(),
            "flowkeep {subcommand} failed: {}\nstdout: {}",
            String::from_utf8_lossy(&output.stderr),
            String::from_utf8_lossy(&output.stdout)
        );
        parse_stdout(&output)
    }

    /// Run a subcommand that takes no `--params` blob (e.g. `execute-queue`, `run-engine`).
    pub fn run_bare(&self, args: &[&str]) -> Output {
        let mut cmd = Command::cargo_bin("flowkeep").expect("flowkeep binary");
        cmd.args(args).env("FLOWKEEP_STATE_DIR", self.state_path());
        cmd.output().expect("spawn flowkeep")
    }

    fn command(&self, subcommand: &str, params: &Value) -> Command {
        let mut cmd = Command::cargo_bin("flowkeep").expect("flowkeep binary");
        cmd.arg(subcommand)
            .arg("--params")
            .arg(params.to_string())
            .env("FLOWKEEP_STATE_DIR", self.state_path());
        cmd
    }
}

fn parse_stdout(output: &Output) -> Value {
    let text = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(text.trim()).unwrap_or_else(|e| panic!("stdout was not JSON ({e}): {text}"))
}

pub fn harness() -> Harness {
    Harness::new()
}

/// A `tools.json` registry with one trusted tool whose command always prints a fixed JSON
/// completion, ignoring whatever `--params` it was called with.
pub fn fixed_output_registry(tool: &str, output_json: &str) -> Value {
    serde_json::json!({
        tool: {
            "command": ["/bin/sh", "-c", format!("echo '{output_json}'")],
            "actions": ["run"],
            "trusted": true,
        }
    })
}

/// A registry whose tool sleeps past any reasonable per-step timeout before printing anything.
pub fn slow_registry(tool: &str, sleep_secs: u64) -> Value {
    serde_json::json!({
        tool: {
            "command": ["/bin/sh", "-c", format!("sleep {sleep_secs}; echo '{{\"status\":\"completed\"}}'")],
            "actions": ["run"],
            "trusted": true,
        }
    })
}
