// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! flowkeep - a rule engine and agent task-queue supervisor driven entirely through the State
//! Store. Every subcommand below maps to one command-surface operation: it loads `Config`,
//! parses `--params` as a JSON blob, calls straight into the library the long-running
//! `run-engine`/`execute-queue` processes also use, and prints one JSON result.

mod commands;
mod exit_error;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowkeep_core::Config;
use output::OutputFormat;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "flowkeep", version, about = "Rule engine and agent task-queue supervisor")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

/// A JSON object blob of parameters, the shape every command-surface operation takes.
#[derive(Parser)]
struct ParamsArgs {
    /// Parameters as a JSON object
    #[arg(long, default_value = "{}")]
    params: String,
}

impl ParamsArgs {
    fn parse_value(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.params)?)
    }
}

#[derive(Subcommand)]
enum Command {
    AddRule(ParamsArgs),
    UpdateRule(ParamsArgs),
    DeleteRule(ParamsArgs),
    GetRule(ParamsArgs),
    GetRules(ParamsArgs),
    ListRules(ParamsArgs),
    AddEventType(ParamsArgs),
    UpdateEventType(ParamsArgs),
    GetEventTypes(ParamsArgs),
    DispatchEvent(ParamsArgs),
    RetryFailed(ParamsArgs),
    RetryFailedEntries(ParamsArgs),
    DryRunRule(ParamsArgs),
    DryRunAllRules(ParamsArgs),
    ValidateRule(ParamsArgs),
    GetExecutionHistory(ParamsArgs),
    ToggleRuleEnabled(ParamsArgs),
    /// Run the rule engine poll loop. Blocks for the lifetime of the process.
    RunEngine {
        /// Seconds between poll passes
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        /// Stop after this many passes (absent: run forever)
        #[arg(long)]
        iterations: Option<u64>,
    },
    AssignTask(ParamsArgs),
    BatchAssignTasks(ParamsArgs),
    CancelTask(ParamsArgs),
    UpdateTask(ParamsArgs),
    CheckTaskStatus(ParamsArgs),
    GetTaskResult(ParamsArgs),
    GetAllResults(ParamsArgs),
    GetRecentTasks(ParamsArgs),
    /// Claim queued tasks (optionally filtered by `agent_id`). Also the subcommand a spawned
    /// worker process runs.
    ProcessQueue(ParamsArgs),
    MarkTaskInProgress(ParamsArgs),
    LogTaskCompletion(ParamsArgs),
    /// Spawn worker processes for the queued tasks under the parallelism cap.
    ExecuteQueue {
        #[arg(long, default_value_t = 1)]
        parallel: usize,
        #[arg(long)]
        agent_id: Option<String>,
    },
    KillAgents(ParamsArgs),
}

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    if let Err(e) = run() {
        let code = e.downcast_ref::<exit_error::ExitError>().map_or(1, |c| c.code);
        eprintln!("Error: {}", format_error(&e));
        std::process::exit(code);
    }
}

/// Deduplicate an anyhow error chain: skip the "Caused by" trailer when the top-level message
/// already contains every cause's text (the common case with `#[from]`-derived thiserror
/// variants).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    if let Command::RunEngine { interval_secs, iterations } = &cli.command {
        return commands::run_engine::run_engine(&config, Duration::from_secs(*interval_secs), *iterations);
    }
    if let Command::ExecuteQueue { parallel, agent_id } = &cli.command {
        let value = commands::spawn::execute_queue(&config, *parallel, agent_id.as_deref())?;
        println!("{}", cli.output.render(&value));
        return Ok(());
    }

    let value = dispatch(&config, &cli.command)?;
    println!("{}", cli.output.render(&value));
    Ok(())
}

fn dispatch(config: &Config, command: &Command) -> Result<Value> {
    use commands::{dispatch, events, rules, spawn, tasks, validate};

    match command {
        Command::AddRule(args) => rules::add_rule(config, &args.parse_value()?),
        Command::UpdateRule(args) => rules::update_rule(config, &args.parse_value()?),
        Command::DeleteRule(args) => rules::delete_rule(config, &args.parse_value()?),
        Command::GetRule(args) => rules::get_rule(config, &args.parse_value()?),
        Command::GetRules(args) => rules::get_rules(config, &args.parse_value()?),
        Command::ListRules(args) => rules::list_rules(config, &args.parse_value()?),
        Command::AddEventType(args) => events::add_event_type(config, &args.parse_value()?),
        Command::UpdateEventType(args) => events::update_event_type(config, &args.parse_value()?),
        Command::GetEventTypes(args) => events::get_event_types(config, &args.parse_value()?),
        Command::DispatchEvent(args) => dispatch::dispatch_event(config, &args.parse_value()?),
        Command::RetryFailed(args) => dispatch::retry_failed(config, &args.parse_value()?),
        Command::RetryFailedEntries(args) => dispatch::retry_failed_entries(config, &args.parse_value()?),
        Command::DryRunRule(args) => validate::dry_run_rule(config, &args.parse_value()?),
        Command::DryRunAllRules(args) => validate::dry_run_all_rules(config, &args.parse_value()?),
        Command::ValidateRule(args) => validate::validate_rule(config, &args.parse_value()?),
        Command::GetExecutionHistory(args) => dispatch::get_execution_history(config, &args.parse_value()?),
        Command::ToggleRuleEnabled(args) => rules::toggle_rule_enabled(config, &args.parse_value()?),
        Command::AssignTask(args) => tasks::assign_task(config, &args.parse_value()?),
        Command::BatchAssignTasks(args) => tasks::batch_assign_tasks(config, &args.parse_value()?),
        Command::CancelTask(args) => tasks::cancel_task(config, &args.parse_value()?),
        Command::UpdateTask(args) => tasks::update_task(config, &args.parse_value()?),
        Command::CheckTaskStatus(args) => tasks::check_task_status(config, &args.parse_value()?),
        Command::GetTaskResult(args) => tasks::get_task_result(config, &args.parse_value()?),
        Command::GetAllResults(args) => tasks::get_all_results(config, &args.parse_value()?),
        Command::GetRecentTasks(args) => tasks::get_recent_tasks(config, &args.parse_value()?),
        Command::ProcessQueue(args) => tasks::process_queue(config, &args.parse_value()?),
        Command::MarkTaskInProgress(args) => tasks::mark_task_in_progress(config, &args.parse_value()?),
        Command::LogTaskCompletion(args) => tasks::log_task_completion(config, &args.parse_value()?),
        Command::KillAgents(args) => spawn::kill_agents(config, &args.parse_value()?),
        Command::RunEngine { .. } | Command::ExecuteQueue { .. } => {
            unreachable!("handled before dispatch")
        }
    }
}
