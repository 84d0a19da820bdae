// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Commands: one declarative unit of robot work
//!
//! A command is created by a `QueueCommand` action and only ever changes
//! through later actions. Commands are never removed; a failed command stays
//! in the history with its error attached.

mod params;
mod result;
mod update;

pub use params::*;
pub use result::CommandResult;
pub use update::*;

use crate::error::ErrorOccurrence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a command
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommandId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CommandId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which queue a command belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandIntent {
    /// Part of the protocol proper; runs only while the run is running
    #[default]
    Protocol,
    /// Runs before the first play, e.g. to home or calibrate
    Setup,
    /// Runs while awaiting recovery to fix up the robot
    Fixit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl CommandStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, CommandStatus::Succeeded | CommandStatus::Failed)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandStatus::Queued => write!(f, "queued"),
            CommandStatus::Running => write!(f, "running"),
            CommandStatus::Succeeded => write!(f, "succeeded"),
            CommandStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A command as submitted by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    #[serde(flatten)]
    pub params: CommandParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default)]
    pub intent: CommandIntent,
}

impl CommandRequest {
    pub fn new(params: CommandParams) -> Self {
        Self {
            params,
            key: None,
            intent: CommandIntent::Protocol,
        }
    }

    pub fn with_intent(mut self, intent: CommandIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl From<CommandParams> for CommandRequest {
    fn from(params: CommandParams) -> Self {
        Self::new(params)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: CommandId,
    pub key: String,
    pub intent: CommandIntent,
    pub status: CommandStatus,
    #[serde(flatten)]
    pub params: CommandParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOccurrence>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Set on a retry copy; points at the failed original
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_command_id: Option<CommandId>,
}

impl Command {
    /// Build a freshly queued command from a request
    pub fn queued(id: CommandId, request: &CommandRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            key: request.key.clone().unwrap_or_else(|| id.0.clone()),
            id,
            intent: request.intent,
            status: CommandStatus::Queued,
            params: request.params.clone(),
            result: None,
            error: None,
            created_at,
            started_at: None,
            completed_at: None,
            failed_command_id: None,
        }
    }

    pub fn command_type(&self) -> &'static str {
        self.params.command_type()
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
