// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command history and the three FIFO queues
//!
//! Protocol, setup, and fixit commands queue separately. Every command ever
//! queued stays in `commands`, in `order`, for the life of the run.

use crate::action::Action;
use crate::command::{Command, CommandId, CommandIntent, CommandStatus};
use crate::error::{ErrorOccurrence, ReduceError};
use crate::recovery::{ErrorRecoveryType, RecoveryResolution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// A page of the command history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandSlice {
    pub commands: Vec<Command>,
    pub cursor: usize,
    pub total_length: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandState {
    commands: BTreeMap<CommandId, Command>,
    order: Vec<CommandId>,
    queued: VecDeque<CommandId>,
    queued_setup: VecDeque<CommandId>,
    queued_fixit: VecDeque<CommandId>,
    running: Option<CommandId>,
    most_recently_failed: Option<CommandId>,
    recovery_target: Option<CommandId>,
}

impl CommandState {
    pub(crate) fn apply(&mut self, action: &Action) -> Result<(), ReduceError> {
        match action {
            Action::QueueCommand {
                command_id,
                created_at,
                request,
            } => {
                let command = Command::queued(command_id.clone(), request, *created_at);
                self.insert_queued(command, false)
            }
            Action::RunCommand {
                command_id,
                started_at,
            } => {
                if let Some(running) = &self.running {
                    return Err(ReduceError::AlreadyRunning {
                        running: running.clone(),
                    });
                }
                let command = self.expect_status(command_id, CommandStatus::Queued)?;
                command.status = CommandStatus::Running;
                command.started_at = Some(*started_at);
                let intent = command.intent;
                self.queue_mut(intent).retain(|id| id != command_id);
                self.running = Some(command_id.clone());
                Ok(())
            }
            Action::SucceedCommand {
                command_id,
                completed_at,
                result,
                ..
            } => {
                let command = self.expect_status(command_id, CommandStatus::Running)?;
                command.status = CommandStatus::Succeeded;
                command.result = Some(result.clone());
                command.completed_at = Some(*completed_at);
                self.running = None;
                Ok(())
            }
            Action::FailCommand {
                command_id,
                failed_at,
                error,
                recovery,
                ..
            } => self.fail(command_id, *failed_at, error, *recovery),
            Action::ResumeFromRecovery { resolution } => {
                let target = self.recovery_target.take();
                match resolution {
                    RecoveryResolution::Continue => Ok(()),
                    RecoveryResolution::Retry {
                        command_id,
                        created_at,
                    } => {
                        let failed_id = target.ok_or(ReduceError::NoRecoveryTarget)?;
                        let failed = self
                            .commands
                            .get(&failed_id)
                            .ok_or_else(|| ReduceError::CommandNotFound(failed_id.clone()))?;
                        let mut retry = failed.clone();
                        retry.id = command_id.clone();
                        retry.status = CommandStatus::Queued;
                        retry.result = None;
                        retry.error = None;
                        retry.created_at = *created_at;
                        retry.started_at = None;
                        retry.completed_at = None;
                        retry.failed_command_id = Some(failed_id);
                        self.insert_queued(retry, true)
                    }
                }
            }
            Action::Stop { .. } => {
                self.recovery_target = None;
                Ok(())
            }
            Action::EngineFault { error, .. } => {
                self.fault(error);
                Ok(())
            }
            Action::Configure { .. }
            | Action::Play { .. }
            | Action::Pause { .. }
            | Action::Finish { .. }
            | Action::HardwareStopped { .. }
            | Action::DoorChange { .. }
            | Action::SetErrorRecoveryPolicy { .. } => Ok(()),
        }
    }

    /// Fail the running command, if any, with an engine fault
    pub(crate) fn fault(&mut self, error: &ErrorOccurrence) {
        let Some(id) = self.running.take() else {
            return;
        };
        if let Some(command) = self.commands.get_mut(&id) {
            command.status = CommandStatus::Failed;
            command.error = Some(error.clone().for_command(id.clone()));
            command.completed_at = Some(error.created_at);
        }
        self.most_recently_failed = Some(id);
    }

    fn fail(
        &mut self,
        command_id: &CommandId,
        failed_at: DateTime<Utc>,
        error: &ErrorOccurrence,
        recovery: ErrorRecoveryType,
    ) -> Result<(), ReduceError> {
        let command = self.expect_status(command_id, CommandStatus::Running)?;
        command.status = CommandStatus::Failed;
        command.error = Some(error.clone());
        command.completed_at = Some(failed_at);
        let intent = command.intent;
        self.running = None;
        self.most_recently_failed = Some(command_id.clone());

        let cancelled: Vec<CommandId> = match (intent, recovery) {
            (CommandIntent::Setup, _) => self.queued_setup.drain(..).collect(),
            (CommandIntent::Fixit, _) => self.queued_fixit.drain(..).collect(),
            (CommandIntent::Protocol, ErrorRecoveryType::FailRun) => self.queued.drain(..).collect(),
            (CommandIntent::Protocol, ErrorRecoveryType::WaitForRecovery) => {
                self.recovery_target = Some(command_id.clone());
                Vec::new()
            }
            (CommandIntent::Protocol, ErrorRecoveryType::IgnoreAndContinue) => Vec::new(),
        };
        for id in cancelled {
            if let Some(command) = self.commands.get_mut(&id) {
                command.status = CommandStatus::Failed;
                command.completed_at = Some(failed_at);
            }
        }
        Ok(())
    }

    fn insert_queued(&mut self, command: Command, at_front: bool) -> Result<(), ReduceError> {
        if self.commands.contains_key(&command.id) {
            return Err(ReduceError::DuplicateCommand(command.id));
        }
        let id = command.id.clone();
        let queue = self.queue_mut(command.intent);
        if at_front {
            queue.push_front(id.clone());
        } else {
            queue.push_back(id.clone());
        }
        self.order.push(id.clone());
        self.commands.insert(id, command);
        Ok(())
    }

    fn expect_status(
        &mut self,
        id: &CommandId,
        expected: CommandStatus,
    ) -> Result<&mut Command, ReduceError> {
        let command = self
            .commands
            .get_mut(id)
            .ok_or_else(|| ReduceError::CommandNotFound(id.clone()))?;
        if command.status != expected {
            return Err(ReduceError::UnexpectedStatus {
                id: id.clone(),
                actual: command.status,
                expected,
            });
        }
        Ok(command)
    }

    fn queue_mut(&mut self, intent: CommandIntent) -> &mut VecDeque<CommandId> {
        match intent {
            CommandIntent::Protocol => &mut self.queued,
            CommandIntent::Setup => &mut self.queued_setup,
            CommandIntent::Fixit => &mut self.queued_fixit,
        }
    }

    // Views

    pub fn get(&self, id: &CommandId) -> Option<&Command> {
        self.commands.get(id)
    }

    pub fn contains(&self, id: &CommandId) -> bool {
        self.commands.contains_key(id)
    }

    /// All commands in the order they were queued
    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.order.iter().filter_map(|id| self.commands.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// A page of `length` commands starting at `cursor`.
    ///
    /// Without a cursor the page ends at the running command, or at the
    /// most recent command if nothing is running.
    pub fn slice(&self, cursor: Option<usize>, length: usize) -> CommandSlice {
        let total_length = self.order.len();
        let cursor = cursor.unwrap_or_else(|| {
            let anchor = self
                .running
                .as_ref()
                .and_then(|id| self.order.iter().position(|o| o == id))
                .unwrap_or(total_length.saturating_sub(1));
            (anchor + 1).saturating_sub(length)
        });
        let cursor = cursor.min(total_length);
        let end = cursor.saturating_add(length).min(total_length);
        let commands = self.order[cursor..end]
            .iter()
            .filter_map(|id| self.commands.get(id).cloned())
            .collect();
        CommandSlice {
            commands,
            cursor,
            total_length,
        }
    }

    pub fn running(&self) -> Option<&Command> {
        self.running.as_ref().and_then(|id| self.commands.get(id))
    }

    pub fn running_id(&self) -> Option<&CommandId> {
        self.running.as_ref()
    }

    /// Head of the queue for the given intent
    pub fn next_queued(&self, intent: CommandIntent) -> Option<&CommandId> {
        match intent {
            CommandIntent::Protocol => self.queued.front(),
            CommandIntent::Setup => self.queued_setup.front(),
            CommandIntent::Fixit => self.queued_fixit.front(),
        }
    }

    pub fn queued_ids(&self, intent: CommandIntent) -> Vec<CommandId> {
        match intent {
            CommandIntent::Protocol => self.queued.iter().cloned().collect(),
            CommandIntent::Setup => self.queued_setup.iter().cloned().collect(),
            CommandIntent::Fixit => self.queued_fixit.iter().cloned().collect(),
        }
    }

    pub fn has_queued(&self, intent: CommandIntent) -> bool {
        self.next_queued(intent).is_some()
    }

    /// The failed command the run is waiting to recover from
    pub fn recovery_target(&self) -> Option<&Command> {
        self.recovery_target
            .as_ref()
            .and_then(|id| self.commands.get(id))
    }

    pub fn most_recently_failed(&self) -> Option<&Command> {
        self.most_recently_failed
            .as_ref()
            .and_then(|id| self.commands.get(id))
    }

    pub fn is_final(&self, id: &CommandId) -> bool {
        self.commands
            .get(id)
            .is_some_and(|c| c.status.is_terminal())
    }

    /// Nothing is running and nothing is queued in any queue
    pub fn all_final(&self) -> bool {
        self.running.is_none()
            && self.queued.is_empty()
            && self.queued_setup.is_empty()
            && self.queued_fixit.is_empty()
    }

    /// Errors attached to failed commands, in queue order
    pub fn errors(&self) -> impl Iterator<Item = &ErrorOccurrence> {
        self.all().filter_map(|c| c.error.as_ref())
    }

    pub fn count_with_status(&self, status: CommandStatus) -> usize {
        self.commands.values().filter(|c| c.status == status).count()
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
