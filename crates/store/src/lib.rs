// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! flowkeep-store: whole-file JSON document persistence for the rule engine and agent
//! supervisor. Every multi-step mutation here is framed by `flowkeep-lock`.

mod docs;
mod entries;
mod error;
mod history;
mod json_file;

pub use docs::{
    EngineStateDocument, EventTypesDocument, ExecutionHistoryDocument, FileSnapshot,
    HistoryRecord, RulesDocument, TaskQueueDocument, TaskResultsDocument,
};
pub use entries::{read_entries, update_entry_status, write_entries};
pub use error::StoreError;
pub use flowkeep_core::EntriesDocument;
pub use history::{append_history, query_history, HistoryQuery, HistoryQueryResult};
pub use json_file::{append_jsonl, read_json, with_lock, write_json};
