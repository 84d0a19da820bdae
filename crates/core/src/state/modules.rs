// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loaded hardware modules

use crate::command::{ModuleSubstate, StateUpdate};
use crate::error::ReduceError;
use crate::types::{DeckSlot, ModuleDefinition, ModuleType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedModule {
    pub id: String,
    pub definition: ModuleDefinition,
    pub location: DeckSlot,
    pub state: ModuleSubstate,
}

impl LoadedModule {
    pub fn module_type(&self) -> ModuleType {
        self.definition.model.module_type()
    }
}

fn idle_substate(module_type: ModuleType) -> ModuleSubstate {
    match module_type {
        ModuleType::Temperature => ModuleSubstate::Temperature {
            target_celsius: None,
        },
        ModuleType::Magnetic => ModuleSubstate::Magnetic {
            engaged_height: None,
        },
        ModuleType::HeaterShaker => ModuleSubstate::HeaterShaker { target_rpm: None },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleState {
    modules: BTreeMap<String, LoadedModule>,
}

impl ModuleState {
    pub(crate) fn apply(&mut self, update: &StateUpdate) -> Result<(), ReduceError> {
        if let Some(loaded) = &update.loaded_module {
            self.modules.insert(
                loaded.module_id.clone(),
                LoadedModule {
                    id: loaded.module_id.clone(),
                    definition: loaded.definition.clone(),
                    location: loaded.location,
                    state: idle_substate(loaded.definition.model.module_type()),
                },
            );
        }
        if let Some(change) = &update.module_state {
            let module = self
                .modules
                .get_mut(&change.module_id)
                .ok_or_else(|| ReduceError::ModuleNotFound(change.module_id.clone()))?;
            module.state = change.state.clone();
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&LoadedModule> {
        self.modules.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &LoadedModule> {
        self.modules.values()
    }

    pub fn in_slot(&self, slot: DeckSlot) -> Option<&LoadedModule> {
        self.modules.values().find(|m| m.location == slot)
    }
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
