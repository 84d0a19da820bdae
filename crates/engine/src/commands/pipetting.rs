// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tip handling and liquid transfer

use super::movement::to_well;
use super::SuccessData;
use crate::error::CommandError;
use pe_adapters::{Movement, Pipetting};
use pe_core::command::{
    BlowOutParams, DropTipParams, LiquidHandlingParams, TipGeometry, WellRef, WellTarget,
    WellVolumeUpdate,
};
use pe_core::{CommandResult, State, StateUpdate};

pub(super) async fn pick_up_tip<M: Movement, P: Pipetting>(
    params: &WellTarget,
    state: &State,
    movement: &M,
    pipetting: &P,
) -> Result<SuccessData, CommandError> {
    let pipette = super::pipette(state, &params.pipette_id)?;
    if state.pipettes.has_tip(&params.pipette_id) {
        return Err(CommandError::TipAlreadyAttached(params.pipette_id.clone()));
    }
    let labware = state
        .labware
        .get(&params.labware_id)
        .ok_or_else(|| CommandError::LabwareNotLoaded(params.labware_id.clone()))?;
    if !labware.definition.is_tiprack {
        return Err(CommandError::NotATipRack(params.labware_id.clone()));
    }
    let well = labware
        .definition
        .wells
        .get(&params.well_name)
        .ok_or_else(|| CommandError::WellNotFound {
            labware_id: params.labware_id.clone(),
            well_name: params.well_name.clone(),
        })?;
    let tip = TipGeometry {
        length: labware.definition.tip_length.unwrap_or_default(),
        volume: well.total_liquid_volume,
    };

    let position = to_well(params, state, pipette.mount, movement).await?;
    pipetting.pick_up_tip(pipette.mount, tip.length).await?;

    let mut update = StateUpdate::default()
        .moved(&params.pipette_id, super::at_well(params, position))
        .tip(&params.pipette_id, Some(tip));
    update.tip_used = Some(WellRef {
        labware_id: params.labware_id.clone(),
        well_name: params.well_name.clone(),
    });
    Ok(SuccessData::new(CommandResult::PickedUpTip {
        tip_volume: tip.volume,
        tip_length: tip.length,
        position,
    })
    .with_update(update))
}

pub(super) async fn drop_tip<M: Movement, P: Pipetting>(
    params: &DropTipParams,
    state: &State,
    movement: &M,
    pipetting: &P,
) -> Result<SuccessData, CommandError> {
    let target = &params.target;
    let pipette = super::pipette(state, &target.pipette_id)?;
    if !state.pipettes.has_tip(&target.pipette_id) {
        return Err(CommandError::TipNotAttached(target.pipette_id.clone()));
    }

    let position = to_well(target, state, pipette.mount, movement).await?;
    pipetting
        .drop_tip(pipette.mount, params.home_after.unwrap_or(true))
        .await?;

    Ok(SuccessData::new(CommandResult::Moved { position }).with_update(
        StateUpdate::default()
            .moved(&target.pipette_id, super::at_well(target, position))
            .tip(&target.pipette_id, None),
    ))
}

pub(super) async fn aspirate<M: Movement, P: Pipetting>(
    params: &LiquidHandlingParams,
    state: &State,
    movement: &M,
    pipetting: &P,
) -> Result<SuccessData, CommandError> {
    let target = &params.target;
    let pipette = super::pipette(state, &target.pipette_id)?;
    let available = state
        .pipettes
        .available_volume(&target.pipette_id)
        .ok_or_else(|| CommandError::TipNotAttached(target.pipette_id.clone()))?;
    check_flow_rate(params.flow_rate)?;
    check_volume(params.volume, available)?;

    let position = to_well(target, state, pipette.mount, movement).await?;
    pipetting
        .aspirate(pipette.mount, params.volume, params.flow_rate)
        .await?;

    let held = state
        .pipettes
        .aspirated_volume(&target.pipette_id)
        .unwrap_or_default()
        + params.volume;
    let mut update = StateUpdate::default()
        .moved(&target.pipette_id, super::at_well(target, position))
        .volume(&target.pipette_id, Some(held));
    // Only wells with known contents are tracked on the way out
    update.well_volume = state
        .liquids
        .well_volume(&target.labware_id, &target.well_name)
        .map(|volume| well_volume(target, (volume - params.volume).max(0.0)));
    Ok(SuccessData::new(CommandResult::Volume {
        volume: params.volume,
        position,
    })
    .with_update(update))
}

pub(super) async fn dispense<M: Movement, P: Pipetting>(
    params: &LiquidHandlingParams,
    state: &State,
    movement: &M,
    pipetting: &P,
) -> Result<SuccessData, CommandError> {
    let target = &params.target;
    let pipette = super::pipette(state, &target.pipette_id)?;
    let held = state
        .pipettes
        .aspirated_volume(&target.pipette_id)
        .ok_or_else(|| CommandError::TipNotAttached(target.pipette_id.clone()))?;
    check_flow_rate(params.flow_rate)?;
    check_volume(params.volume, held)?;

    let position = to_well(target, state, pipette.mount, movement).await?;
    pipetting
        .dispense(pipette.mount, params.volume, params.flow_rate)
        .await?;

    let in_well = state
        .liquids
        .well_volume(&target.labware_id, &target.well_name)
        .unwrap_or_default();
    let mut update = StateUpdate::default()
        .moved(&target.pipette_id, super::at_well(target, position))
        .volume(&target.pipette_id, Some(held - params.volume));
    update.well_volume = Some(well_volume(target, in_well + params.volume));
    Ok(SuccessData::new(CommandResult::Volume {
        volume: params.volume,
        position,
    })
    .with_update(update))
}

pub(super) async fn blow_out<M: Movement, P: Pipetting>(
    params: &BlowOutParams,
    state: &State,
    movement: &M,
    pipetting: &P,
) -> Result<SuccessData, CommandError> {
    let target = &params.target;
    let pipette = super::pipette(state, &target.pipette_id)?;
    if !state.pipettes.has_tip(&target.pipette_id) {
        return Err(CommandError::TipNotAttached(target.pipette_id.clone()));
    }
    check_flow_rate(params.flow_rate)?;

    let position = to_well(target, state, pipette.mount, movement).await?;
    pipetting.blow_out(pipette.mount, params.flow_rate).await?;

    Ok(SuccessData::new(CommandResult::Moved { position }).with_update(
        StateUpdate::default()
            .moved(&target.pipette_id, super::at_well(target, position))
            .volume(&target.pipette_id, Some(0.0)),
    ))
}

fn check_volume(volume: f64, limit: f64) -> Result<(), CommandError> {
    if !volume.is_finite() || volume <= 0.0 {
        return Err(CommandError::InvalidVolume {
            volume,
            reason: "must be greater than zero".to_string(),
        });
    }
    if volume > limit {
        return Err(CommandError::InvalidVolume {
            volume,
            reason: format!("exceeds the {limit} µL available"),
        });
    }
    Ok(())
}

fn check_flow_rate(flow_rate: f64) -> Result<(), CommandError> {
    if flow_rate.is_finite() && flow_rate > 0.0 {
        Ok(())
    } else {
        Err(CommandError::InvalidParams(format!(
            "flow rate must be greater than zero, got {flow_rate}"
        )))
    }
}

fn well_volume(target: &WellTarget, volume: f64) -> WellVolumeUpdate {
    WellVolumeUpdate {
        labware_id: target.labware_id.clone(),
        well_name: target.well_name.clone(),
        volume,
    }
}

#[cfg(test)]
#[path = "pipetting_tests.rs"]
mod tests;
