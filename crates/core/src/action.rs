// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Actions: immutable facts, the only input to state mutation
//!
//! Everything an action's reducers need (ids, timestamps, results) is
//! decided before dispatch so that replaying the same actions always yields
//! the same state.

use crate::command::{CommandId, CommandRequest, CommandResult, StateUpdate};
use crate::error::ErrorOccurrence;
use crate::recovery::{ErrorRecoveryPolicy, ErrorRecoveryType, RecoveryResolution};
use crate::state::StateConfig;
use crate::types::DoorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who asked for a pause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PauseSource {
    Client,
    Protocol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// First entry of every run: the settings the run started with
    Configure { config: StateConfig },
    #[serde(rename_all = "camelCase")]
    QueueCommand {
        command_id: CommandId,
        created_at: DateTime<Utc>,
        request: CommandRequest,
    },
    #[serde(rename_all = "camelCase")]
    RunCommand {
        command_id: CommandId,
        started_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    SucceedCommand {
        command_id: CommandId,
        completed_at: DateTime<Utc>,
        result: CommandResult,
        #[serde(default, skip_serializing_if = "StateUpdate::is_empty")]
        state_update: StateUpdate,
    },
    #[serde(rename_all = "camelCase")]
    FailCommand {
        command_id: CommandId,
        failed_at: DateTime<Utc>,
        error: ErrorOccurrence,
        recovery: ErrorRecoveryType,
        #[serde(default, skip_serializing_if = "StateUpdate::is_empty")]
        state_update: StateUpdate,
    },
    #[serde(rename_all = "camelCase")]
    Play { requested_at: DateTime<Utc> },
    Pause { source: PauseSource },
    #[serde(rename_all = "camelCase")]
    Stop {
        requested_at: DateTime<Utc>,
        /// Set when the stop came from an emergency stop
        #[serde(default, skip_serializing_if = "Option::is_none")]
        estop: Option<ErrorOccurrence>,
    },
    ResumeFromRecovery { resolution: RecoveryResolution },
    #[serde(rename_all = "camelCase")]
    Finish {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<ErrorOccurrence>,
        set_run_status: bool,
    },
    #[serde(rename_all = "camelCase")]
    HardwareStopped {
        completed_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finish_error: Option<ErrorOccurrence>,
    },
    DoorChange { door: DoorState },
    SetErrorRecoveryPolicy { policy: ErrorRecoveryPolicy },
    #[serde(rename_all = "camelCase")]
    EngineFault {
        error: ErrorOccurrence,
        /// Set when the fault struck the action that would have completed
        /// the run, so the run still completes
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed_at: Option<DateTime<Utc>>,
    },
}

impl Action {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Action::Configure { .. } => "configure",
            Action::QueueCommand { .. } => "queue_command",
            Action::RunCommand { .. } => "run_command",
            Action::SucceedCommand { .. } => "succeed_command",
            Action::FailCommand { .. } => "fail_command",
            Action::Play { .. } => "play",
            Action::Pause { .. } => "pause",
            Action::Stop { .. } => "stop",
            Action::ResumeFromRecovery { .. } => "resume_from_recovery",
            Action::Finish { .. } => "finish",
            Action::HardwareStopped { .. } => "hardware_stopped",
            Action::DoorChange { .. } => "door_change",
            Action::SetErrorRecoveryPolicy { .. } => "set_error_recovery_policy",
            Action::EngineFault { .. } => "engine_fault",
        }
    }

    /// Key-value pairs for structured logging
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Action::QueueCommand {
                command_id,
                request,
                ..
            } => vec![
                ("command_id", command_id.to_string()),
                ("command_type", request.params.command_type().to_string()),
            ],
            Action::RunCommand { command_id, .. } | Action::SucceedCommand { command_id, .. } => {
                vec![("command_id", command_id.to_string())]
            }
            Action::FailCommand {
                command_id,
                error,
                recovery,
                ..
            } => vec![
                ("command_id", command_id.to_string()),
                ("error_code", error.error_code.to_string()),
                ("recovery", format!("{:?}", recovery)),
            ],
            Action::Pause { source } => vec![("source", format!("{:?}", source))],
            Action::Stop { estop, .. } => vec![("estop", estop.is_some().to_string())],
            Action::ResumeFromRecovery { resolution } => match resolution {
                RecoveryResolution::Continue => vec![("resolution", "continue".to_string())],
                RecoveryResolution::Retry { command_id, .. } => vec![
                    ("resolution", "retry".to_string()),
                    ("command_id", command_id.to_string()),
                ],
            },
            Action::DoorChange { door } => vec![("door", format!("{:?}", door))],
            Action::EngineFault { error, .. } => vec![("detail", error.detail.clone())],
            _ => vec![],
        }
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
