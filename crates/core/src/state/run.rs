// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run-level state: queue status, result, door, and recovery policy

use super::commands::CommandState;
use crate::action::Action;
use crate::command::CommandIntent;
use crate::error::ErrorOccurrence;
use crate::recovery::{ErrorRecoveryPolicy, ErrorRecoveryType};
use crate::types::DoorState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the worker may pull commands off the queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueueStatus {
    /// Before the first play; only setup commands run
    Setup,
    Running,
    Paused,
    /// A protocol command failed; only fixit commands run
    AwaitingRecovery,
    AwaitingRecoveryPaused,
}

/// Outcome of a run once it is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunResult {
    Succeeded,
    Failed,
    Stopped,
}

/// Public run status, derived from [`RunState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Ready,
    Running,
    Paused,
    BlockedByOpenDoor,
    StopRequested,
    Finishing,
    Stopped,
    AwaitingRecovery,
    AwaitingRecoveryPaused,
    AwaitingRecoveryBlockedByOpenDoor,
    Succeeded,
    Failed,
}

impl RunStatus {
    /// No further commands will ever execute
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Stopped | RunStatus::Succeeded | RunStatus::Failed
        )
    }

    pub fn is_awaiting_recovery(self) -> bool {
        matches!(
            self,
            RunStatus::AwaitingRecovery
                | RunStatus::AwaitingRecoveryPaused
                | RunStatus::AwaitingRecoveryBlockedByOpenDoor
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Ready => "ready",
            RunStatus::Running => "running",
            RunStatus::Paused => "paused",
            RunStatus::BlockedByOpenDoor => "blocked-by-open-door",
            RunStatus::StopRequested => "stop-requested",
            RunStatus::Finishing => "finishing",
            RunStatus::Stopped => "stopped",
            RunStatus::AwaitingRecovery => "awaiting-recovery",
            RunStatus::AwaitingRecoveryPaused => "awaiting-recovery-paused",
            RunStatus::AwaitingRecoveryBlockedByOpenDoor => "awaiting-recovery-blocked-by-open-door",
            RunStatus::Succeeded => "succeeded",
            RunStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    queue_status: QueueStatus,
    run_result: Option<RunResult>,
    door: DoorState,
    block_on_door_open: bool,
    door_blocking: bool,
    stopped_by_estop: bool,
    has_entered_recovery: bool,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    run_error: Option<ErrorOccurrence>,
    finish_error: Option<ErrorOccurrence>,
    error_recovery_policy: ErrorRecoveryPolicy,
}

impl RunState {
    pub fn new(block_on_door_open: bool, error_recovery_policy: ErrorRecoveryPolicy) -> Self {
        Self {
            queue_status: QueueStatus::Setup,
            run_result: None,
            door: DoorState::Closed,
            block_on_door_open,
            door_blocking: false,
            stopped_by_estop: false,
            has_entered_recovery: false,
            started_at: None,
            completed_at: None,
            run_error: None,
            finish_error: None,
            error_recovery_policy,
        }
    }

    /// Apply an action. `commands` is the command state before this action.
    pub(crate) fn apply(&mut self, action: &Action, commands: &CommandState) {
        match action {
            Action::SucceedCommand { state_update, .. } => {
                if state_update.pause_requested && self.queue_status == QueueStatus::Running {
                    self.queue_status = QueueStatus::Paused;
                }
            }
            Action::FailCommand {
                command_id,
                error,
                recovery,
                ..
            } => {
                let intent = commands.get(command_id).map(|c| c.intent);
                if intent != Some(CommandIntent::Protocol) {
                    return;
                }
                match recovery {
                    ErrorRecoveryType::WaitForRecovery => {
                        self.queue_status = QueueStatus::AwaitingRecovery;
                        self.has_entered_recovery = true;
                    }
                    ErrorRecoveryType::FailRun => {
                        if self.run_result.is_none() {
                            self.queue_status = QueueStatus::Paused;
                            self.run_result = Some(RunResult::Failed);
                            self.run_error.get_or_insert_with(|| error.clone());
                        }
                    }
                    ErrorRecoveryType::IgnoreAndContinue => {}
                }
            }
            Action::Play { requested_at } => {
                if self.run_result.is_some() {
                    return;
                }
                self.started_at.get_or_insert(*requested_at);
                self.queue_status = match self.queue_status {
                    QueueStatus::Setup if self.door_blocking => QueueStatus::Paused,
                    QueueStatus::Setup | QueueStatus::Paused => QueueStatus::Running,
                    QueueStatus::AwaitingRecoveryPaused => QueueStatus::AwaitingRecovery,
                    other => other,
                };
            }
            Action::Pause { .. } => {
                self.queue_status = match self.queue_status {
                    QueueStatus::Setup | QueueStatus::Running => QueueStatus::Paused,
                    QueueStatus::AwaitingRecovery => QueueStatus::AwaitingRecoveryPaused,
                    other => other,
                };
            }
            Action::ResumeFromRecovery { .. } => {
                if self.run_result.is_none() {
                    self.queue_status = QueueStatus::Running;
                }
            }
            Action::Stop { estop, .. } => {
                if self.run_result.is_some() {
                    return;
                }
                self.queue_status = QueueStatus::Paused;
                match estop {
                    Some(error) => {
                        self.stopped_by_estop = true;
                        self.run_result = Some(RunResult::Failed);
                        self.run_error.get_or_insert_with(|| error.clone());
                    }
                    None => self.run_result = Some(RunResult::Stopped),
                }
            }
            Action::Finish {
                error,
                set_run_status,
            } => {
                if self.run_result.is_none() {
                    self.queue_status = QueueStatus::Paused;
                    self.run_result = Some(match (set_run_status, error) {
                        (true, None) => RunResult::Succeeded,
                        (true, Some(_)) => RunResult::Failed,
                        (false, _) => RunResult::Stopped,
                    });
                    if let Some(error) = error {
                        self.run_error.get_or_insert_with(|| error.clone());
                    }
                } else if self.stopped_by_estop {
                    if let Some(error) = error {
                        self.run_error = Some(error.clone());
                    }
                }
            }
            Action::HardwareStopped {
                completed_at,
                finish_error,
            } => {
                self.queue_status = QueueStatus::Paused;
                self.run_result.get_or_insert(RunResult::Stopped);
                self.completed_at.get_or_insert(*completed_at);
                if let Some(error) = finish_error {
                    self.finish_error = Some(error.clone());
                }
            }
            Action::DoorChange { door } => {
                self.door = *door;
                if !self.block_on_door_open {
                    return;
                }
                self.door_blocking = *door == DoorState::Open;
                if self.door_blocking {
                    self.queue_status = match self.queue_status {
                        QueueStatus::Running => QueueStatus::Paused,
                        QueueStatus::AwaitingRecovery => QueueStatus::AwaitingRecoveryPaused,
                        other => other,
                    };
                }
            }
            Action::SetErrorRecoveryPolicy { policy } => {
                self.error_recovery_policy = policy.clone();
            }
            Action::Configure { config } => {
                self.block_on_door_open = config.block_on_door_open;
                self.door_blocking = config.block_on_door_open && self.door == DoorState::Open;
                self.error_recovery_policy = config.error_recovery_policy.clone();
            }
            Action::EngineFault {
                error,
                completed_at,
            } => self.fault(error, *completed_at),
            Action::QueueCommand { .. } | Action::RunCommand { .. } => {}
        }
    }

    /// Force the run to fail. Terminal runs keep their result.
    pub(crate) fn fault(&mut self, error: &ErrorOccurrence, completed_at: Option<DateTime<Utc>>) {
        if self.completed_at.is_some() {
            return;
        }
        self.queue_status = QueueStatus::Paused;
        self.run_result = Some(RunResult::Failed);
        self.run_error.get_or_insert_with(|| error.clone());
        self.completed_at = completed_at;
    }

    pub fn status(&self) -> RunStatus {
        match (self.run_result, self.completed_at) {
            (Some(RunResult::Succeeded), None) => RunStatus::Finishing,
            (Some(_), None) => RunStatus::StopRequested,
            (Some(_), Some(_)) if self.finish_error.is_some() => RunStatus::Failed,
            (Some(RunResult::Succeeded), Some(_)) => RunStatus::Succeeded,
            (Some(RunResult::Failed), Some(_)) => RunStatus::Failed,
            (Some(RunResult::Stopped), Some(_)) => RunStatus::Stopped,
            (None, _) => match self.queue_status {
                QueueStatus::Setup => RunStatus::Ready,
                QueueStatus::Running => RunStatus::Running,
                QueueStatus::Paused if self.door_blocking => RunStatus::BlockedByOpenDoor,
                QueueStatus::Paused => RunStatus::Paused,
                QueueStatus::AwaitingRecovery => RunStatus::AwaitingRecovery,
                QueueStatus::AwaitingRecoveryPaused if self.door_blocking => {
                    RunStatus::AwaitingRecoveryBlockedByOpenDoor
                }
                QueueStatus::AwaitingRecoveryPaused => RunStatus::AwaitingRecoveryPaused,
            },
        }
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.queue_status
    }

    pub fn result(&self) -> Option<RunResult> {
        self.run_result
    }

    /// A result is latched; only post-run cleanup may still be pending
    pub fn is_stopping(&self) -> bool {
        self.run_result.is_some()
    }

    /// Post-run cleanup has settled
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn door(&self) -> DoorState {
        self.door
    }

    pub fn is_door_blocking(&self) -> bool {
        self.door_blocking
    }

    pub fn stopped_by_estop(&self) -> bool {
        self.stopped_by_estop
    }

    pub fn has_entered_recovery(&self) -> bool {
        self.has_entered_recovery
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Error that ended the run, if any
    pub fn run_error(&self) -> Option<&ErrorOccurrence> {
        self.run_error.as_ref()
    }

    /// Error raised by post-run cleanup, if any
    pub fn finish_error(&self) -> Option<&ErrorOccurrence> {
        self.finish_error.as_ref()
    }

    pub fn error_recovery_policy(&self) -> &ErrorRecoveryPolicy {
        &self.error_recovery_policy
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
