// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading labware, pipettes, modules, and liquids

use super::SuccessData;
use crate::error::CommandError;
use pe_adapters::Equipment;
use pe_core::command::{
    DefineLiquidParams, LiquidDefinedUpdate, LiquidLoadedUpdate, LoadLabwareParams,
    LoadLiquidParams, LoadModuleParams, LoadPipetteParams, LoadedLabwareUpdate,
    LoadedModuleUpdate, LoadedPipetteUpdate,
};
use pe_core::types::{DeckSlot, LabwareLocation};
use pe_core::{CommandResult, IdGen, State, StateUpdate};

pub(super) async fn load_labware<E: Equipment, I: IdGen>(
    params: &LoadLabwareParams,
    state: &State,
    equipment: &E,
    ids: &I,
) -> Result<SuccessData, CommandError> {
    check_labware_location(state, &params.location)?;
    let labware_id = ids.or_next(params.labware_id.as_deref());
    if state.labware.get(&labware_id).is_some() {
        return Err(CommandError::IdInUse {
            kind: "labware",
            id: labware_id,
        });
    }
    let definition = equipment
        .load_labware_definition(&params.load_name, &params.namespace, params.version)
        .await?;

    Ok(SuccessData::new(CommandResult::LoadedLabware {
        labware_id: labware_id.clone(),
    })
    .with_update(StateUpdate {
        loaded_labware: Some(LoadedLabwareUpdate {
            labware_id,
            definition,
            location: params.location.clone(),
            display_name: params.display_name.clone(),
        }),
        ..StateUpdate::default()
    }))
}

fn check_labware_location(state: &State, location: &LabwareLocation) -> Result<(), CommandError> {
    match location {
        LabwareLocation::Slot { slot } => {
            check_slot_exists(*slot)?;
            if state.modules.in_slot(*slot).is_some() {
                return Err(CommandError::LocationOccupied(format!(
                    "a module is in slot {slot}"
                )));
            }
        }
        LabwareLocation::Module { module_id } => {
            if state.modules.get(module_id).is_none() {
                return Err(CommandError::ModuleNotLoaded(module_id.clone()));
            }
        }
        LabwareLocation::Labware { labware_id } => {
            if state.labware.get(labware_id).is_none() {
                return Err(CommandError::LabwareNotLoaded(labware_id.clone()));
            }
        }
        LabwareLocation::OffDeck => {}
    }
    if let Some(occupant) = state.labware.occupant_of(location) {
        return Err(CommandError::LocationOccupied(format!(
            "labware {} is already there",
            occupant.id
        )));
    }
    Ok(())
}

fn check_slot_exists(slot: DeckSlot) -> Result<(), CommandError> {
    match slot.origin() {
        Some(_) => Ok(()),
        None => Err(CommandError::InvalidParams(format!("no deck slot {slot}"))),
    }
}

/// Reloading a pipette id is only allowed on the mount it already occupies
pub(super) async fn load_pipette<E: Equipment, I: IdGen>(
    params: &LoadPipetteParams,
    state: &State,
    equipment: &E,
    ids: &I,
) -> Result<SuccessData, CommandError> {
    let pipette_id = ids.or_next(params.pipette_id.as_deref());
    if let Some(loaded) = state.pipettes.get(&pipette_id) {
        if loaded.mount != params.mount {
            return Err(CommandError::IdInUse {
                kind: "pipette",
                id: pipette_id,
            });
        }
    }
    let config = equipment
        .load_pipette(params.mount, &params.pipette_name)
        .await?;

    Ok(SuccessData::new(CommandResult::LoadedPipette {
        pipette_id: pipette_id.clone(),
    })
    .with_update(StateUpdate {
        loaded_pipette: Some(LoadedPipetteUpdate {
            pipette_id,
            mount: params.mount,
            config,
        }),
        ..StateUpdate::default()
    }))
}

pub(super) async fn load_module<E: Equipment, I: IdGen>(
    params: &LoadModuleParams,
    state: &State,
    equipment: &E,
    ids: &I,
) -> Result<SuccessData, CommandError> {
    let slot = params.location;
    check_slot_exists(slot)?;
    if let Some(module) = state.modules.in_slot(slot) {
        return Err(CommandError::LocationOccupied(format!(
            "module {} is already in slot {slot}",
            module.id
        )));
    }
    if let Some(labware) = state.labware.occupant_of(&LabwareLocation::Slot { slot }) {
        return Err(CommandError::LocationOccupied(format!(
            "labware {} is in slot {slot}",
            labware.id
        )));
    }
    let module_id = ids.or_next(params.module_id.as_deref());
    if state.modules.get(&module_id).is_some() {
        return Err(CommandError::IdInUse {
            kind: "module",
            id: module_id,
        });
    }
    let definition = equipment
        .load_module(&module_id, params.model, slot)
        .await?;

    Ok(SuccessData::new(CommandResult::LoadedModule {
        module_id: module_id.clone(),
        model: params.model,
    })
    .with_update(StateUpdate {
        loaded_module: Some(LoadedModuleUpdate {
            module_id,
            definition,
            location: slot,
        }),
        ..StateUpdate::default()
    }))
}

pub(super) fn define_liquid<I: IdGen>(params: &DefineLiquidParams, ids: &I) -> SuccessData {
    let liquid_id = ids.or_next(params.liquid_id.as_deref());
    SuccessData::new(CommandResult::DefinedLiquid {
        liquid_id: liquid_id.clone(),
    })
    .with_update(StateUpdate {
        liquid_defined: Some(LiquidDefinedUpdate {
            liquid_id,
            display_name: params.display_name.clone(),
            description: params.description.clone(),
            display_color: params.display_color.clone(),
        }),
        ..StateUpdate::default()
    })
}

pub(super) fn load_liquid(
    params: &LoadLiquidParams,
    state: &State,
) -> Result<SuccessData, CommandError> {
    if state.liquids.get(&params.liquid_id).is_none() {
        return Err(CommandError::LiquidNotDefined(params.liquid_id.clone()));
    }
    if state.labware.get(&params.labware_id).is_none() {
        return Err(CommandError::LabwareNotLoaded(params.labware_id.clone()));
    }
    for (well_name, volume) in &params.volume_by_well {
        let well = state
            .labware
            .well(&params.labware_id, well_name)
            .ok_or_else(|| CommandError::WellNotFound {
                labware_id: params.labware_id.clone(),
                well_name: well_name.clone(),
            })?;
        if !volume.is_finite() || *volume < 0.0 || *volume > well.total_liquid_volume {
            return Err(CommandError::InvalidVolume {
                volume: *volume,
                reason: format!(
                    "well {well_name} holds between 0 and {} µL",
                    well.total_liquid_volume
                ),
            });
        }
    }

    Ok(SuccessData::new(CommandResult::Empty).with_update(StateUpdate {
        liquid_loaded: Some(LiquidLoadedUpdate {
            liquid_id: params.liquid_id.clone(),
            labware_id: params.labware_id.clone(),
            volume_by_well: params.volume_by_well.clone(),
        }),
        ..StateUpdate::default()
    }))
}

#[cfg(test)]
#[path = "equipment_tests.rs"]
mod tests;
