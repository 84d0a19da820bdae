// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hardware capability traits
//!
//! Command implementations never see a whole robot. Each one is handed only
//! the narrow capabilities it needs, taken from a [`Hardware`] bundle.

pub mod catalog;
mod simulated;

pub use simulated::{SimulatedHardware, SimulatorConfig};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeHardware, HardwareCall};

use async_trait::async_trait;
use pe_core::types::{
    DeckSlot, LabwareDefinition, ModuleDefinition, ModuleModel, MotorAxis, MountType,
    PipetteConfig, Point,
};
use pe_core::ErrorCode;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Errors raised by hardware
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    #[error("no pipette attached to the {0} mount")]
    PipetteNotAttached(MountType),
    #[error("unknown pipette model: {0}")]
    UnknownPipette(String),
    #[error("unknown labware definition: {namespace}/{load_name}/{version}")]
    UnknownLabware {
        namespace: String,
        load_name: String,
        version: u32,
    },
    #[error("module not attached: {0}")]
    ModuleNotAttached(String),
    #[error("no tip attached to the {0} pipette")]
    NoTipAttached(MountType),
    #[error("a tip is already attached to the {0} pipette")]
    TipAlreadyAttached(MountType),
    #[error("motion failed: {0}")]
    Motion(String),
    #[error("homing failed: {0}")]
    Homing(String),
    #[error("pipetting failed: {0}")]
    Pipetting(String),
    #[error("module error: {0}")]
    Module(String),
    #[error("communication error: {0}")]
    Communication(String),
    #[error("emergency stop is engaged")]
    EstopEngaged,
}

impl HardwareError {
    /// Classification recorded when this error fails a command
    pub fn error_code(&self) -> ErrorCode {
        match self {
            HardwareError::PipetteNotAttached(_) => ErrorCode::PipetteNotLoaded,
            HardwareError::NoTipAttached(_) => ErrorCode::TipNotAttached,
            HardwareError::TipAlreadyAttached(_) => ErrorCode::UnexpectedTipAttached,
            HardwareError::Motion(_) => ErrorCode::MotionFailed,
            HardwareError::Homing(_) => ErrorCode::HomingFailed,
            HardwareError::Pipetting(_) | HardwareError::Module(_) => {
                ErrorCode::RoboticsInteractionError
            }
            HardwareError::Communication(_) => ErrorCode::CommunicationError,
            HardwareError::EstopEngaged => ErrorCode::EStopActivated,
            HardwareError::UnknownPipette(_)
            | HardwareError::UnknownLabware { .. }
            | HardwareError::ModuleNotAttached(_) => ErrorCode::InvalidCommandParams,
        }
    }

    /// Error type name recorded alongside the code
    pub fn error_type(&self) -> &'static str {
        match self {
            HardwareError::PipetteNotAttached(_) => "PipetteNotAttachedError",
            HardwareError::UnknownPipette(_) => "PipetteNotFoundError",
            HardwareError::UnknownLabware { .. } => "LabwareDefinitionDoesNotExistError",
            HardwareError::ModuleNotAttached(_) => "ModuleNotAttachedError",
            HardwareError::NoTipAttached(_) => "TipNotAttachedError",
            HardwareError::TipAlreadyAttached(_) => "TipAttachedError",
            HardwareError::Motion(_) => "MotionFailedError",
            HardwareError::Homing(_) => "HomingFailedError",
            HardwareError::Pipetting(_) => "PipettingError",
            HardwareError::Module(_) => "ModuleError",
            HardwareError::Communication(_) => "CommunicationError",
            HardwareError::EstopEngaged => "EStopActivatedError",
        }
    }
}

/// Asynchronous notifications pushed by hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareEvent {
    DoorOpened,
    DoorClosed,
    EstopEngaged,
    EstopDisengaged,
}

/// Gantry motion
#[async_trait]
pub trait Movement: Clone + Send + Sync + 'static {
    /// Move the pipette on `mount` to `target`, travelling no lower than
    /// `minimum_z` between points. Returns where the pipette ended up.
    async fn move_to(
        &self,
        mount: MountType,
        target: Point,
        minimum_z: Option<f64>,
    ) -> Result<Point, HardwareError>;

    /// Home the given axes, or every axis when `None`
    async fn home(&self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError>;

    async fn current_position(&self, mount: MountType) -> Result<Point, HardwareError>;
}

/// Plunger and tip handling on an attached pipette
#[async_trait]
pub trait Pipetting: Clone + Send + Sync + 'static {
    async fn aspirate(&self, mount: MountType, volume: f64, flow_rate: f64)
        -> Result<(), HardwareError>;

    async fn dispense(&self, mount: MountType, volume: f64, flow_rate: f64)
        -> Result<(), HardwareError>;

    async fn blow_out(&self, mount: MountType, flow_rate: f64) -> Result<(), HardwareError>;

    async fn pick_up_tip(&self, mount: MountType, tip_length: f64) -> Result<(), HardwareError>;

    async fn drop_tip(&self, mount: MountType, home_after: bool) -> Result<(), HardwareError>;
}

/// Definitions and attached instruments
#[async_trait]
pub trait Equipment: Clone + Send + Sync + 'static {
    async fn load_labware_definition(
        &self,
        load_name: &str,
        namespace: &str,
        version: u32,
    ) -> Result<LabwareDefinition, HardwareError>;

    /// Confirm a pipette of the named model is on `mount`
    async fn load_pipette(
        &self,
        mount: MountType,
        pipette_name: &str,
    ) -> Result<PipetteConfig, HardwareError>;

    /// Confirm a module of `model` is in `location` and register it as `module_id`
    async fn load_module(
        &self,
        module_id: &str,
        model: ModuleModel,
        location: DeckSlot,
    ) -> Result<ModuleDefinition, HardwareError>;
}

/// Temperature, magnetic, and heater-shaker modules
#[async_trait]
pub trait ModuleControl: Clone + Send + Sync + 'static {
    async fn set_target_temperature(&self, module_id: &str, celsius: f64)
        -> Result<(), HardwareError>;

    async fn deactivate_temperature(&self, module_id: &str) -> Result<(), HardwareError>;

    async fn engage_magnet(&self, module_id: &str, height: f64) -> Result<(), HardwareError>;

    async fn disengage_magnet(&self, module_id: &str) -> Result<(), HardwareError>;

    /// Returns once the shaker has reached `rpm`
    async fn set_shake_speed(&self, module_id: &str, rpm: f64) -> Result<(), HardwareError>;

    async fn deactivate_shaker(&self, module_id: &str) -> Result<(), HardwareError>;
}

/// Run-level timing
#[async_trait]
pub trait RunControl: Clone + Send + Sync + 'static {
    async fn wait_for_duration(&self, duration: Duration) -> Result<(), HardwareError>;
}

#[async_trait]
pub trait RailLights: Clone + Send + Sync + 'static {
    async fn set_rail_lights(&self, on: bool) -> Result<(), HardwareError>;
}

/// Capability bundle handed to the engine
pub trait Hardware: Clone + Send + Sync + 'static {
    type Movement: Movement;
    type Pipetting: Pipetting;
    type Equipment: Equipment;
    type Modules: ModuleControl;
    type RunControl: RunControl;
    type RailLights: RailLights;

    fn movement(&self) -> Self::Movement;
    fn pipetting(&self) -> Self::Pipetting;
    fn equipment(&self) -> Self::Equipment;
    fn modules(&self) -> Self::Modules;
    fn run_control(&self) -> Self::RunControl;
    fn rail_lights(&self) -> Self::RailLights;

    /// Subscribe to door and estop notifications
    fn events(&self) -> broadcast::Receiver<HardwareEvent>;
}
