// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations
//!
//! One function per command type. Each validates its parameters against the
//! snapshot it was started from, drives only the capabilities it is handed,
//! and describes what it changed as a [`StateUpdate`]. None of them touch
//! the store.

mod equipment;
mod modules;
mod movement;
mod pipetting;
mod run_control;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::error::CommandError;
use pe_adapters::Hardware;
use pe_core::command::{CurrentLocation, WellTarget};
use pe_core::state::LoadedPipette;
use pe_core::{CommandParams, CommandResult, IdGen, Point, State, StateUpdate};

/// What a successful command reports and changes
#[derive(Debug, Clone, PartialEq)]
pub struct SuccessData {
    pub result: CommandResult,
    pub state_update: StateUpdate,
}

impl SuccessData {
    fn new(result: CommandResult) -> Self {
        Self {
            result,
            state_update: StateUpdate::default(),
        }
    }

    fn with_update(mut self, state_update: StateUpdate) -> Self {
        self.state_update = state_update;
        self
    }
}

/// Run one command against hardware
pub async fn execute<H: Hardware, I: IdGen>(
    params: &CommandParams,
    state: &State,
    hardware: &H,
    ids: &I,
) -> Result<SuccessData, CommandError> {
    match params {
        CommandParams::LoadLabware(p) => {
            equipment::load_labware(p, state, &hardware.equipment(), ids).await
        }
        CommandParams::LoadPipette(p) => {
            equipment::load_pipette(p, state, &hardware.equipment(), ids).await
        }
        CommandParams::LoadModule(p) => {
            equipment::load_module(p, state, &hardware.equipment(), ids).await
        }
        CommandParams::DefineLiquid(p) => Ok(equipment::define_liquid(p, ids)),
        CommandParams::LoadLiquid(p) => equipment::load_liquid(p, state),
        CommandParams::PickUpTip(p) => {
            pipetting::pick_up_tip(p, state, &hardware.movement(), &hardware.pipetting()).await
        }
        CommandParams::DropTip(p) => {
            pipetting::drop_tip(p, state, &hardware.movement(), &hardware.pipetting()).await
        }
        CommandParams::Aspirate(p) => {
            pipetting::aspirate(p, state, &hardware.movement(), &hardware.pipetting()).await
        }
        CommandParams::Dispense(p) => {
            pipetting::dispense(p, state, &hardware.movement(), &hardware.pipetting()).await
        }
        CommandParams::BlowOut(p) => {
            pipetting::blow_out(p, state, &hardware.movement(), &hardware.pipetting()).await
        }
        CommandParams::MoveToWell(p) => movement::move_to_well(p, state, &hardware.movement()).await,
        CommandParams::MoveToCoordinates(p) => {
            movement::move_to_coordinates(p, state, &hardware.movement()).await
        }
        CommandParams::Home(p) => movement::home(p, &hardware.movement()).await,
        CommandParams::WaitForDuration(p) => {
            run_control::wait_for_duration(p, &hardware.run_control()).await
        }
        CommandParams::WaitForResume(p) => Ok(run_control::wait_for_resume(p)),
        CommandParams::Comment(p) => Ok(run_control::comment(p)),
        CommandParams::SetRailLights(p) => {
            run_control::set_rail_lights(p, &hardware.rail_lights()).await
        }
        CommandParams::SetTargetTemperature(p) => {
            modules::set_target_temperature(p, state, &hardware.modules()).await
        }
        CommandParams::DeactivateTemperature(p) => {
            modules::deactivate_temperature(p, state, &hardware.modules()).await
        }
        CommandParams::EngageMagnet(p) => {
            modules::engage_magnet(p, state, &hardware.modules()).await
        }
        CommandParams::DisengageMagnet(p) => {
            modules::disengage_magnet(p, state, &hardware.modules()).await
        }
        CommandParams::SetShakeSpeed(p) => {
            modules::set_shake_speed(p, state, &hardware.modules()).await
        }
        CommandParams::DeactivateShaker(p) => {
            modules::deactivate_shaker(p, state, &hardware.modules()).await
        }
    }
}

fn pipette<'a>(state: &'a State, pipette_id: &str) -> Result<&'a LoadedPipette, CommandError> {
    state
        .pipettes
        .get(pipette_id)
        .ok_or_else(|| CommandError::PipetteNotLoaded(pipette_id.to_string()))
}

/// Absolute position of the target, checking the labware and well exist
fn target_position(state: &State, target: &WellTarget) -> Result<Point, CommandError> {
    if state.labware.get(&target.labware_id).is_none() {
        return Err(CommandError::LabwareNotLoaded(target.labware_id.clone()));
    }
    if state
        .labware
        .well(&target.labware_id, &target.well_name)
        .is_none()
    {
        return Err(CommandError::WellNotFound {
            labware_id: target.labware_id.clone(),
            well_name: target.well_name.clone(),
        });
    }
    state
        .well_position(&target.labware_id, &target.well_name, &target.well_location)
        .ok_or_else(|| CommandError::LabwareOffDeck(target.labware_id.clone()))
}

fn at_well(target: &WellTarget, position: Point) -> CurrentLocation {
    CurrentLocation {
        labware_id: Some(target.labware_id.clone()),
        well_name: Some(target.well_name.clone()),
        position,
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
