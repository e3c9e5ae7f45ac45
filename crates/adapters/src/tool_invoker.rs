// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A process-based [`ToolInvoker`]: every `{tool, action, params}` leaf action is run as a
//! subprocess, `<command> <action> --params <json>`, with stdout captured and a wall-clock
//! deadline enforced by killing the child on expiry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use flowkeep_engine::{InvokerResponse, ToolCatalogEntry, ToolInvoker};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::process::Command;

use crate::subprocess::run_with_timeout;

/// One tool's registry entry: the executable (and any fixed leading args) to invoke it
/// through, the actions it's known to support, and whether it may bypass the engine's
/// tool-name validation as a "trusted" first-party tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub command: Vec<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub trusted: bool,
}

/// `tools.json`: `{tool_name -> ToolDefinition}`, the registry a [`ProcessToolInvoker`] reads
/// at construction.
pub type ToolRegistry = HashMap<String, ToolDefinition>;

/// Runs every tool invocation as a subprocess according to a static [`ToolRegistry`].
pub struct ProcessToolInvoker {
    registry: ToolRegistry,
}

fn blocking_runtime() -> &'static tokio::runtime::Runtime {
    static RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
    RT.get_or_init(|| {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed to start the tool-invoker runtime")
    })
}

impl ProcessToolInvoker {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Load a registry from `path` (an empty registry if the file does not exist yet).
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let registry = match std::fs::read(path) {
            Ok(bytes) if bytes.is_empty() => ToolRegistry::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ToolRegistry::new(),
            Err(e) => return Err(e),
        };
        Ok(Self::new(registry))
    }
}

impl ToolInvoker for ProcessToolInvoker {
    fn catalog(&self) -> Vec<ToolCatalogEntry> {
        self.registry
            .iter()
            .map(|(tool, def)| ToolCatalogEntry { tool: tool.clone(), actions: def.actions.clone() })
            .collect()
    }

    fn resolves(&self, tool: &str) -> bool {
        self.registry.get(tool).is_some_and(|def| def.trusted)
    }

    fn invoke(&self, tool: &str, action: &str, params: &Value, bypass_enforcement: bool, timeout: Duration) -> InvokerResponse {
        let start = std::time::Instant::now();
        let Some(def) = self.registry.get(tool) else {
            return InvokerResponse {
                timed_out: false,
                stdout: serde_json::json!({"status": "error", "error": format!("unknown tool `{tool}`")}).to_string(),
                duration: start.elapsed(),
            };
        };

        let Some((executable, base_args)) = def.command.split_first() else {
            return InvokerResponse {
                timed_out: false,
                stdout: serde_json::json!({"status": "error", "error": format!("tool `{tool}` has no command configured")}).to_string(),
                duration: start.elapsed(),
            };
        };

        let mut cmd = Command::new(executable);
        cmd.args(base_args).arg(action).arg("--params").arg(params.to_string());
        if bypass_enforcement {
            cmd.env("FLOWKEEP_BYPASS_ENFORCEMENT", "1");
        }

        let description = format!("{tool}.{action}");
        let output = blocking_runtime().block_on(run_with_timeout(cmd, timeout, &description));

        match output {
            Ok(output) if output.status.success() => InvokerResponse {
                timed_out: false,
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                duration: start.elapsed(),
            },
            Ok(output) => InvokerResponse {
                timed_out: false,
                stdout: serde_json::json!({
                    "status": "error",
                    "error": String::from_utf8_lossy(&output.stderr).trim().to_string(),
                })
                .to_string(),
                duration: start.elapsed(),
            },
            Err(message) if message.contains("timed out") => {
                InvokerResponse { timed_out: true, stdout: String::new(), duration: start.elapsed() }
            }
            Err(message) => InvokerResponse {
                timed_out: false,
                stdout: serde_json::json!({"status": "error", "error": message}).to_string(),
                duration: start.elapsed(),
            },
        }
    }
}

#[cfg(test)]
#[path = "tool_invoker_tests.rs"]
mod tests;
