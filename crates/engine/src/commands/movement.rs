// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SuccessData;
use crate::error::CommandError;
use pe_adapters::Movement;
use pe_core::command::{
    CurrentLocation, HomeParams, MoveToCoordinatesParams, PipetteLocationUpdate, WellTarget,
};
use pe_core::{CommandResult, MountType, Point, State, StateUpdate};

pub(super) async fn move_to_well<M: Movement>(
    params: &WellTarget,
    state: &State,
    movement: &M,
) -> Result<SuccessData, CommandError> {
    let pipette = super::pipette(state, &params.pipette_id)?;
    let position = to_well(params, state, pipette.mount, movement).await?;
    Ok(
        SuccessData::new(CommandResult::Moved { position }).with_update(
            StateUpdate::default().moved(&params.pipette_id, super::at_well(params, position)),
        ),
    )
}

/// Move `mount` over a well, staying above everything on the deck in transit
pub(super) async fn to_well<M: Movement>(
    target: &WellTarget,
    state: &State,
    mount: MountType,
    movement: &M,
) -> Result<Point, CommandError> {
    let destination = super::target_position(state, target)?;
    let position = movement
        .move_to(mount, destination, Some(state.highest_z()))
        .await?;
    Ok(position)
}

pub(super) async fn move_to_coordinates<M: Movement>(
    params: &MoveToCoordinatesParams,
    state: &State,
    movement: &M,
) -> Result<SuccessData, CommandError> {
    let pipette = super::pipette(state, &params.pipette_id)?;
    let position = movement
        .move_to(pipette.mount, params.coordinates, params.minimum_z_height)
        .await?;
    let location = CurrentLocation {
        labware_id: None,
        well_name: None,
        position,
    };
    Ok(SuccessData::new(CommandResult::Moved { position })
        .with_update(StateUpdate::default().moved(&params.pipette_id, location)))
}

pub(super) async fn home<M: Movement>(
    params: &HomeParams,
    movement: &M,
) -> Result<SuccessData, CommandError> {
    movement.home(params.axes.as_deref()).await?;
    Ok(SuccessData::new(CommandResult::Empty).with_update(StateUpdate {
        pipette_location: Some(PipetteLocationUpdate::ClearAll),
        ..StateUpdate::default()
    }))
}

#[cfg(test)]
#[path = "movement_tests.rs"]
mod tests;
