// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The State Store's data: an aggregate of independent sub-states
//!
//! Each sub-state owns a reducer. [`State::reduce`] composes them on a copy
//! of the current state, so a rejected action leaves the original untouched.
//! Views that need more than one sub-state (geometry, what runs next,
//! control legality) live here on the aggregate.

mod commands;
mod errors;
mod labware;
mod liquids;
mod modules;
mod pipettes;
mod run;

#[cfg(test)]
pub(crate) mod fixtures;

pub use commands::{CommandSlice, CommandState};
pub use errors::ErrorState;
pub use labware::{LabwareState, LoadedLabware};
pub use liquids::{Liquid, LiquidState, WellLiquid};
pub use modules::{LoadedModule, ModuleState};
pub use pipettes::{LoadedPipette, PipetteState};
pub use run::{QueueStatus, RunResult, RunState, RunStatus};

use crate::action::Action;
use crate::command::{Command, CommandId, CommandIntent, CommandStatus, StateUpdate};
use crate::error::{ControlError, ErrorOccurrence, ReduceError};
use crate::recovery::{ErrorRecoveryPolicy, RecoveryResolution};
use crate::types::{LabwareLocation, Point, WellLocation, WellOrigin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Settings fixed for the life of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_true")]
    pub block_on_door_open: bool,
    #[serde(default)]
    pub error_recovery_policy: ErrorRecoveryPolicy,
}

fn default_true() -> bool {
    true
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            block_on_door_open: true,
            error_recovery_policy: ErrorRecoveryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub commands: CommandState,
    pub labware: LabwareState,
    pub pipettes: PipetteState,
    pub modules: ModuleState,
    pub liquids: LiquidState,
    pub errors: ErrorState,
    pub run: RunState,
}

impl State {
    pub fn new(config: &StateConfig) -> Self {
        Self {
            commands: CommandState::default(),
            labware: LabwareState::default(),
            pipettes: PipetteState::default(),
            modules: ModuleState::default(),
            liquids: LiquidState::default(),
            errors: ErrorState::default(),
            run: RunState::new(config.block_on_door_open, config.error_recovery_policy.clone()),
        }
    }

    /// Compute the state after `action`. Pure: no I/O, deterministic.
    pub fn reduce(&self, action: &Action) -> Result<State, ReduceError> {
        let mut next = self.clone();
        next.apply(action)?;
        Ok(next)
    }

    /// The state after an engine fault. Never fails.
    ///
    /// `completed_at` marks the run complete as well, for a fault that
    /// struck the run's final action.
    pub fn with_fault(&self, error: &ErrorOccurrence, completed_at: Option<DateTime<Utc>>) -> State {
        let mut next = self.clone();
        next.apply_fault(error, completed_at);
        next
    }

    fn apply(&mut self, action: &Action) -> Result<(), ReduceError> {
        if let Action::EngineFault {
            error,
            completed_at,
        } = action
        {
            self.apply_fault(error, *completed_at);
            return Ok(());
        }
        // The run reducer reads command intents as they were before this action
        self.run.apply(action, &self.commands);
        self.commands.apply(action)?;
        if let Some(update) = state_update(action) {
            self.labware.apply(update)?;
            self.pipettes.apply(update)?;
            self.modules.apply(update)?;
            self.liquids.apply(update)?;
        }
        self.errors.apply(action);
        Ok(())
    }

    fn apply_fault(&mut self, error: &ErrorOccurrence, completed_at: Option<DateTime<Utc>>) {
        self.run.fault(error, completed_at);
        self.commands.fault(error);
        self.errors.record(error);
    }

    pub fn status(&self) -> RunStatus {
        self.run.status()
    }

    pub fn command(&self, id: &CommandId) -> Result<&Command, ControlError> {
        self.commands
            .get(id)
            .ok_or_else(|| ControlError::CommandNotFound(id.clone()))
    }

    /// The error that best explains how the run ended
    pub fn run_error(&self) -> Option<&ErrorOccurrence> {
        self.run.run_error().or_else(|| self.run.finish_error())
    }

    /// The command the worker should start next, if any.
    ///
    /// Fixit commands run while awaiting recovery, setup commands run unless
    /// the run is paused or recovering, and protocol commands run only while
    /// the run is running. Nothing runs once a result is latched or while
    /// another command is running.
    pub fn next_to_execute(&self) -> Option<&CommandId> {
        if self.run.is_stopping() || self.commands.running_id().is_some() {
            return None;
        }
        match self.run.queue_status() {
            QueueStatus::AwaitingRecovery => self.commands.next_queued(CommandIntent::Fixit),
            QueueStatus::AwaitingRecoveryPaused | QueueStatus::Paused => None,
            QueueStatus::Setup => self.commands.next_queued(CommandIntent::Setup),
            QueueStatus::Running => self
                .commands
                .next_queued(CommandIntent::Setup)
                .or_else(|| self.commands.next_queued(CommandIntent::Protocol)),
        }
    }

    /// Running with nothing left to do
    pub fn is_drained(&self) -> bool {
        self.run.queue_status() == QueueStatus::Running
            && !self.run.is_stopping()
            && self.commands.all_final()
    }

    // Geometry views

    /// Front-left-bottom corner of a piece of labware in deck coordinates
    pub fn labware_origin(&self, labware_id: &str) -> Option<Point> {
        self.location_origin(&self.labware.get(labware_id)?.location, 0)
    }

    fn location_origin(&self, location: &LabwareLocation, depth: usize) -> Option<Point> {
        // Stacks deeper than the deck has slots are cycles
        if depth > usize::from(crate::types::DeckSlot::COUNT) {
            return None;
        }
        match location {
            LabwareLocation::Slot { slot } => slot.origin(),
            LabwareLocation::Module { module_id } => {
                let module = self.modules.get(module_id)?;
                Some(module.location.origin()? + module.definition.labware_offset)
            }
            LabwareLocation::Labware { labware_id } => {
                let below = self.labware.get(labware_id)?;
                let origin = self.location_origin(&below.location, depth + 1)?;
                Some(origin + Point::new(0.0, 0.0, below.definition.dimensions.z_dimension))
            }
            LabwareLocation::OffDeck => None,
        }
    }

    /// Top of a piece of labware, `None` if it is off deck
    pub fn labware_highest_z(&self, labware_id: &str) -> Option<f64> {
        let labware = self.labware.get(labware_id)?;
        let origin = self.labware_origin(labware_id)?;
        Some(origin.z + labware.definition.dimensions.z_dimension)
    }

    /// Highest point of anything on the deck
    pub fn highest_z(&self) -> f64 {
        let labware = self
            .labware
            .all()
            .filter_map(|l| self.labware_highest_z(&l.id));
        let modules = self
            .modules
            .all()
            .map(|m| m.definition.dimensions.z_dimension);
        labware.chain(modules).fold(0.0, f64::max)
    }

    /// Absolute position of a location within a well
    pub fn well_position(
        &self,
        labware_id: &str,
        well_name: &str,
        location: &WellLocation,
    ) -> Option<Point> {
        let origin = self.labware_origin(labware_id)?;
        let well = self.labware.well(labware_id, well_name)?;
        let z = match location.origin {
            WellOrigin::Bottom => well.z,
            WellOrigin::Center => well.z + well.depth / 2.0,
            WellOrigin::Top => well.z + well.depth,
        };
        Some(origin + Point::new(well.x, well.y, z) + location.offset)
    }

    // Control legality. `Ok(false)` means the request is already satisfied.

    pub fn validate_play(&self) -> Result<bool, ControlError> {
        self.ensure_not_stopped()?;
        if matches!(
            self.status(),
            RunStatus::BlockedByOpenDoor | RunStatus::AwaitingRecoveryBlockedByOpenDoor
        ) {
            return Err(ControlError::RobotDoorOpen);
        }
        Ok(!matches!(
            self.run.queue_status(),
            QueueStatus::Running | QueueStatus::AwaitingRecovery
        ))
    }

    pub fn validate_pause(&self) -> Result<bool, ControlError> {
        self.ensure_not_stopped()?;
        match self.run.queue_status() {
            QueueStatus::Running => Ok(true),
            QueueStatus::Paused | QueueStatus::AwaitingRecoveryPaused => Ok(false),
            QueueStatus::Setup | QueueStatus::AwaitingRecovery => {
                Err(ControlError::PauseNotAllowed {
                    status: self.status(),
                })
            }
        }
    }

    pub fn validate_stop(&self) -> Result<bool, ControlError> {
        if self.run.is_completed() {
            return Err(ControlError::RunStopped {
                status: self.status(),
            });
        }
        Ok(!self.run.is_stopping())
    }

    pub fn validate_finish(&self) -> Result<bool, ControlError> {
        self.validate_stop()
    }

    pub fn validate_resume_from_recovery(
        &self,
        resolution: &RecoveryResolution,
    ) -> Result<(), ControlError> {
        self.ensure_not_stopped()?;
        if self.run.queue_status() != QueueStatus::AwaitingRecovery {
            return Err(ControlError::ResumeFromRecoveryNotAllowed {
                status: self.status(),
            });
        }
        if self.commands.has_queued(CommandIntent::Fixit) {
            return Err(ControlError::FixitCommandsQueued);
        }
        if let RecoveryResolution::Retry { command_id, .. } = resolution {
            if self.commands.contains(command_id) {
                return Err(ControlError::DuplicateCommandId(command_id.clone()));
            }
        }
        Ok(())
    }

    pub fn validate_queue(&self, id: &CommandId, intent: CommandIntent) -> Result<(), ControlError> {
        self.ensure_not_stopped()?;
        if self.commands.contains(id) {
            return Err(ControlError::DuplicateCommandId(id.clone()));
        }
        match intent {
            CommandIntent::Setup if self.run.queue_status() != QueueStatus::Setup => {
                Err(ControlError::SetupCommandNotAllowed)
            }
            CommandIntent::Fixit if self.run.queue_status() != QueueStatus::AwaitingRecovery => {
                Err(ControlError::FixitCommandNotAllowed)
            }
            _ => Ok(()),
        }
    }

    fn ensure_not_stopped(&self) -> Result<(), ControlError> {
        if self.run.is_stopping() {
            return Err(ControlError::RunStopped {
                status: self.status(),
            });
        }
        Ok(())
    }

    /// Number of commands currently running; never more than one
    pub fn running_count(&self) -> usize {
        self.commands.count_with_status(CommandStatus::Running)
    }
}

fn state_update(action: &Action) -> Option<&StateUpdate> {
    match action {
        Action::SucceedCommand { state_update, .. } | Action::FailCommand { state_update, .. } => {
            Some(state_update)
        }
        _ => None,
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
