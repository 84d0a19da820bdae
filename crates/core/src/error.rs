// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error records and error types shared across the engine

use crate::command::{CommandId, CommandStatus};
use crate::state::RunStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Broad category an [`ErrorCode`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Communication,
    RoboticsControl,
    RoboticsInteraction,
    General,
}

/// Classification code attached to every recorded error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    CommunicationError,
    CommandTimedOut,
    RoboticsControlError,
    MotionFailed,
    HomingFailed,
    RoboticsInteractionError,
    PipetteNotLoaded,
    TipNotAttached,
    UnexpectedTipAttached,
    EStopActivated,
    GeneralError,
    InvalidCommandParams,
    EngineFault,
}

impl ErrorCode {
    /// Four-digit code; the leading digit is the category
    pub fn code(self) -> &'static str {
        match self {
            ErrorCode::CommunicationError => "1000",
            ErrorCode::CommandTimedOut => "1001",
            ErrorCode::RoboticsControlError => "2000",
            ErrorCode::MotionFailed => "2001",
            ErrorCode::HomingFailed => "2002",
            ErrorCode::RoboticsInteractionError => "3000",
            ErrorCode::PipetteNotLoaded => "3001",
            ErrorCode::TipNotAttached => "3002",
            ErrorCode::UnexpectedTipAttached => "3003",
            ErrorCode::EStopActivated => "3008",
            ErrorCode::GeneralError => "4000",
            ErrorCode::InvalidCommandParams => "4001",
            ErrorCode::EngineFault => "4002",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self.code().as_bytes().first() {
            Some(b'1') => ErrorCategory::Communication,
            Some(b'2') => ErrorCategory::RoboticsControl,
            Some(b'3') => ErrorCategory::RoboticsInteraction,
            _ => ErrorCategory::General,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A recorded, classified failure. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOccurrence {
    pub id: String,
    pub error_type: String,
    pub error_code: ErrorCode,
    pub detail: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<CommandId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrapped_errors: Vec<ErrorOccurrence>,
}

impl ErrorOccurrence {
    pub fn new(
        id: impl Into<String>,
        error_type: impl Into<String>,
        error_code: ErrorCode,
        detail: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            error_type: error_type.into(),
            error_code,
            detail: detail.into(),
            created_at,
            command_id: None,
            wrapped_errors: Vec::new(),
        }
    }

    /// Attach the error to the command that raised it
    pub fn for_command(mut self, command_id: CommandId) -> Self {
        self.command_id = Some(command_id);
        self
    }

    pub fn wrapping(mut self, cause: ErrorOccurrence) -> Self {
        self.wrapped_errors.push(cause);
        self
    }
}

/// A reducer rejected an action as inconsistent with current state.
///
/// Reducers are pure, so any of these means the action stream itself is
/// wrong; the dispatcher treats it as an engine fault.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    #[error("command not found: {0}")]
    CommandNotFound(CommandId),
    #[error("command already exists: {0}")]
    DuplicateCommand(CommandId),
    #[error("command {id} is {actual}, expected {expected}")]
    UnexpectedStatus {
        id: CommandId,
        actual: CommandStatus,
        expected: CommandStatus,
    },
    #[error("command {running} is still running")]
    AlreadyRunning { running: CommandId },
    #[error("pipette not found: {0}")]
    PipetteNotFound(String),
    #[error("labware not found: {0}")]
    LabwareNotFound(String),
    #[error("module not found: {0}")]
    ModuleNotFound(String),
    #[error("liquid not found: {0}")]
    LiquidNotFound(String),
    #[error("no failed command to recover from")]
    NoRecoveryTarget,
}

/// A control request that is not legal for the current run status.
/// Returned without mutating state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    #[error("run has already stopped ({status})")]
    RunStopped { status: RunStatus },
    #[error("cannot pause a run that is {status}")]
    PauseNotAllowed { status: RunStatus },
    #[error("cannot resume from recovery while the run is {status}")]
    ResumeFromRecoveryNotAllowed { status: RunStatus },
    #[error("cannot resume from recovery while fixit commands are queued")]
    FixitCommandsQueued,
    #[error("robot door is open")]
    RobotDoorOpen,
    #[error("setup commands are only allowed before the run starts")]
    SetupCommandNotAllowed,
    #[error("fixit commands are only allowed while awaiting recovery")]
    FixitCommandNotAllowed,
    #[error("command id already in use: {0}")]
    DuplicateCommandId(CommandId),
    #[error("command not found: {0}")]
    CommandNotFound(CommandId),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
