// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-type CRUD (§1b `get_event_types`, §6 command surface). `event_types.json` is a bare
//! mapping with no wrapper key, never auto-deleted.

use std::path::Path;
use std::time::Duration;

use flowkeep_core::EventType;
use flowkeep_store::{with_lock, EventTypesDocument};

use crate::error::EngineError;

pub fn add_event_type(path: &Path, event_key: &str, event_type: EventType, lock_timeout: Duration) -> Result<(), EngineError> {
    with_lock(path, lock_timeout, || {
        let mut doc: EventTypesDocument = flowkeep_store::read_json(path)?;
        doc.insert(event_key.to_string(), event_type.clone());
        flowkeep_store::write_json(path, &doc)
    })?;
    Ok(())
}

pub fn update_event_type(path: &Path, event_key: &str, event_type: EventType, lock_timeout: Duration) -> Result<(), EngineError> {
    let found = with_lock(path, lock_timeout, || {
        let mut doc: EventTypesDocument = flowkeep_store::read_json(path)?;
        let found = doc.contains_key(event_key);
        if found {
            doc.insert(event_key.to_string(), event_type.clone());
            flowkeep_store::write_json(path, &doc)?;
        }
        Ok(found)
    })?;
    if found {
        Ok(())
    } else {
        Err(EngineError::NotFound(event_key.to_string()))
    }
}

pub fn get_event_types(path: &Path) -> Result<EventTypesDocument, EngineError> {
    Ok(flowkeep_store::read_json(path)?)
}

#[cfg(test)]
#[path = "event_types_tests.rs"]
mod tests;
