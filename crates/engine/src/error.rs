// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the protocol engine

use pe_adapters::HardwareError;
use pe_core::types::ModuleType;
use pe_core::{ControlError, ErrorCode, ReduceError};
use pe_storage::LogError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by the public engine API
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error(transparent)]
    Fault(#[from] EngineFault),
}

/// The engine itself misbehaved. The run is forced to fail.
#[derive(Debug, Error)]
pub enum EngineFault {
    #[error("dispatch called from inside another dispatch")]
    ReentrantDispatch,
    #[error("handler {handler} failed on {action}: {source}")]
    Handler {
        handler: &'static str,
        action: &'static str,
        #[source]
        source: HandlerError,
    },
    #[error("reducer rejected {action}: {source}")]
    Reduce {
        action: &'static str,
        #[source]
        source: ReduceError,
    },
}

/// Failure of an action handler
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("action log: {0}")]
    Log(#[from] LogError),
    #[error("{0}")]
    Rejected(String),
}

/// Why a command failed. Recorded on the command, never propagated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("pipette not loaded: {0}")]
    PipetteNotLoaded(String),
    #[error("labware not loaded: {0}")]
    LabwareNotLoaded(String),
    #[error("module not loaded: {0}")]
    ModuleNotLoaded(String),
    #[error("liquid not defined: {0}")]
    LiquidNotDefined(String),
    #[error("well {well_name} does not exist in labware {labware_id}")]
    WellNotFound {
        labware_id: String,
        well_name: String,
    },
    #[error("labware {0} is not on the deck")]
    LabwareOffDeck(String),
    #[error("pipette {0} has no tip attached")]
    TipNotAttached(String),
    #[error("pipette {0} already has a tip attached")]
    TipAlreadyAttached(String),
    #[error("labware {0} is not a tip rack")]
    NotATipRack(String),
    #[error("invalid volume {volume} µL: {reason}")]
    InvalidVolume { volume: f64, reason: String },
    #[error("location is occupied: {0}")]
    LocationOccupied(String),
    #[error("{kind} id {id} is already loaded")]
    IdInUse { kind: &'static str, id: String },
    #[error("module {module_id} is a {actual}, expected a {expected}")]
    WrongModuleType {
        module_id: String,
        expected: ModuleType,
        actual: ModuleType,
    },
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("command timed out after {0:?}")]
    TimedOut(Duration),
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

impl CommandError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            CommandError::PipetteNotLoaded(_) => ErrorCode::PipetteNotLoaded,
            CommandError::TipNotAttached(_) => ErrorCode::TipNotAttached,
            CommandError::TipAlreadyAttached(_) => ErrorCode::UnexpectedTipAttached,
            CommandError::TimedOut(_) => ErrorCode::CommandTimedOut,
            CommandError::Hardware(e) => e.error_code(),
            CommandError::LabwareNotLoaded(_)
            | CommandError::ModuleNotLoaded(_)
            | CommandError::LiquidNotDefined(_)
            | CommandError::WellNotFound { .. }
            | CommandError::LabwareOffDeck(_)
            | CommandError::NotATipRack(_)
            | CommandError::InvalidVolume { .. }
            | CommandError::LocationOccupied(_)
            | CommandError::IdInUse { .. }
            | CommandError::WrongModuleType { .. }
            | CommandError::InvalidParams(_) => ErrorCode::InvalidCommandParams,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            CommandError::PipetteNotLoaded(_) => "PipetteNotLoadedError",
            CommandError::LabwareNotLoaded(_) => "LabwareNotLoadedError",
            CommandError::ModuleNotLoaded(_) => "ModuleNotLoadedError",
            CommandError::LiquidNotDefined(_) => "LiquidDoesNotExistError",
            CommandError::WellNotFound { .. } => "WellDoesNotExistError",
            CommandError::LabwareOffDeck(_) => "LabwareNotOnDeckError",
            CommandError::TipNotAttached(_) => "TipNotAttachedError",
            CommandError::TipAlreadyAttached(_) => "TipAttachedError",
            CommandError::NotATipRack(_) => "LabwareIsNotTipRackError",
            CommandError::InvalidVolume { .. } => "InvalidPipettingVolumeError",
            CommandError::LocationOccupied(_) => "LocationIsOccupiedError",
            CommandError::IdInUse { .. } => "IdAlreadyLoadedError",
            CommandError::WrongModuleType { .. } => "WrongModuleTypeError",
            CommandError::InvalidParams(_) => "InvalidCommandParamsError",
            CommandError::TimedOut(_) => "CommandTimedOutError",
            CommandError::Hardware(e) => e.error_type(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
