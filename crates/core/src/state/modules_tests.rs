// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::command::LoadedModuleUpdate;
use crate::types::{Dimensions, ModuleModel, Point};
use yare::parameterized;

fn load(model: ModuleModel, slot: u8) -> StateUpdate {
    StateUpdate {
        loaded_module: Some(LoadedModuleUpdate {
            module_id: "mod".into(),
            definition: ModuleDefinition {
                model,
                display_name: "Module".into(),
                dimensions: Dimensions::default(),
                labware_offset: Point::default(),
            },
            location: DeckSlot(slot),
        }),
        ..Default::default()
    }
}

#[parameterized(
    temperature = { ModuleModel::TemperatureModuleV2, ModuleSubstate::Temperature { target_celsius: None } },
    magnetic = { ModuleModel::MagneticModuleV2, ModuleSubstate::Magnetic { engaged_height: None } },
    heater_shaker = { ModuleModel::HeaterShakerModuleV1, ModuleSubstate::HeaterShaker { target_rpm: None } },
)]
fn loaded_modules_start_idle(model: ModuleModel, expected: ModuleSubstate) {
    let mut state = ModuleState::default();
    state.apply(&load(model, 1)).unwrap();
    assert_eq!(state.get("mod").unwrap().state, expected);
    assert_eq!(state.in_slot(DeckSlot(1)).unwrap().module_type(), model.module_type());
}

#[test]
fn module_state_updates_replace_substate() {
    let mut state = ModuleState::default();
    state.apply(&load(ModuleModel::TemperatureModuleV2, 3)).unwrap();
    let target = ModuleSubstate::Temperature {
        target_celsius: Some(4.0),
    };
    state
        .apply(&StateUpdate::default().module("mod", target.clone()))
        .unwrap();
    assert_eq!(state.get("mod").unwrap().state, target);
}

#[test]
fn module_state_for_unknown_module_is_rejected() {
    let update = StateUpdate::default().module("ghost", ModuleSubstate::HeaterShaker { target_rpm: None });
    assert_eq!(
        ModuleState::default().apply(&update),
        Err(ReduceError::ModuleNotFound("ghost".into()))
    );
}
