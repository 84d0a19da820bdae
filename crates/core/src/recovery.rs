// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error recovery policy and resolutions

use crate::command::{CommandId, CommandIntent};
use crate::error::ErrorOccurrence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a command failure does to the rest of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorRecoveryType {
    /// Idle in `AwaitingRecovery` until an operator resolves it
    #[default]
    WaitForRecovery,
    /// Fail every queued command and fail the run
    FailRun,
    /// Record the failure and carry on with the next command
    IgnoreAndContinue,
}

/// Chooses an [`ErrorRecoveryType`] for each failed command.
///
/// Overrides are keyed by error type name or by four-digit error code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecoveryPolicy {
    #[serde(default)]
    pub default: ErrorRecoveryType,
    #[serde(default)]
    pub overrides: BTreeMap<String, ErrorRecoveryType>,
}

impl ErrorRecoveryPolicy {
    pub fn new(default: ErrorRecoveryType) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, key: impl Into<String>, recovery: ErrorRecoveryType) -> Self {
        self.overrides.insert(key.into(), recovery);
        self
    }

    /// Recovery for a failure of a command with the given intent.
    ///
    /// Setup and fixit commands never enter recovery: their failure is
    /// handled by failing the rest of their own queue.
    pub fn recovery_for(&self, intent: CommandIntent, error: &ErrorOccurrence) -> ErrorRecoveryType {
        if intent != CommandIntent::Protocol {
            return ErrorRecoveryType::FailRun;
        }
        self.overrides
            .get(&error.error_type)
            .or_else(|| self.overrides.get(error.error_code.code()))
            .copied()
            .unwrap_or(self.default)
    }
}

/// How an operator resolves a run that is awaiting recovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RecoveryResolution {
    /// Leave the failed command failed and continue with the next one
    Continue,
    /// Queue a copy of the failed command ahead of everything else
    #[serde(rename_all = "camelCase")]
    Retry {
        command_id: CommandId,
        created_at: DateTime<Utc>,
    },
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
