// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action handlers shipped with the engine

use crate::dispatcher::ActionHandler;
use crate::error::HandlerError;
use pe_core::{Action, State};
use pe_storage::ActionLog;
use std::sync::Mutex;

/// Persists every action to the action log before it is applied
pub struct ActionRecorder {
    log: Mutex<ActionLog>,
}

impl ActionRecorder {
    pub fn new(log: ActionLog) -> Self {
        Self {
            log: Mutex::new(log),
        }
    }
}

impl ActionHandler for ActionRecorder {
    fn name(&self) -> &'static str {
        "action_recorder"
    }

    fn handle(&self, action: &Action, _state: &State) -> Result<(), HandlerError> {
        let mut log = self.log.lock().unwrap_or_else(|e| e.into_inner());
        let sequence = log.append(action)?;
        tracing::trace!(sequence, action = action.name(), "recorded");
        Ok(())
    }
}

/// Logs every action with its structured fields
pub struct TracingHandler;

impl ActionHandler for TracingHandler {
    fn name(&self) -> &'static str {
        "tracing"
    }

    fn handle(&self, action: &Action, state: &State) -> Result<(), HandlerError> {
        tracing::debug!(
            action = action.name(),
            fields = ?action.fields(),
            status = %state.status(),
            "dispatch"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
