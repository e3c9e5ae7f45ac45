// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newtype identifiers for entities addressed across crate boundaries.

use crate::define_id;

define_id! {
    /// Key of a rule inside the rules document.
    pub struct RuleKey;
}

define_id! {
    /// Key of an entry inside a file's `entries` map.
    pub struct EntryKey;
}

define_id! {
    /// Identifier of a queued/in-flight task.
    pub struct TaskId;
}

define_id! {
    /// Identifier of an external worker agent, used to partition claimed tasks.
    pub struct AgentId;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
