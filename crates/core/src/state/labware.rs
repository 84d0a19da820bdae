// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loaded labware and tip usage

use crate::command::StateUpdate;
use crate::error::ReduceError;
use crate::types::{LabwareDefinition, LabwareLocation, WellDefinition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedLabware {
    pub id: String,
    pub definition: LabwareDefinition,
    pub location: LabwareLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareState {
    labware: BTreeMap<String, LoadedLabware>,
    used_tips: BTreeMap<String, BTreeSet<String>>,
}

impl LabwareState {
    pub(crate) fn apply(&mut self, update: &StateUpdate) -> Result<(), ReduceError> {
        if let Some(loaded) = &update.loaded_labware {
            self.labware.insert(
                loaded.labware_id.clone(),
                LoadedLabware {
                    id: loaded.labware_id.clone(),
                    definition: loaded.definition.clone(),
                    location: loaded.location.clone(),
                    display_name: loaded.display_name.clone(),
                },
            );
        }
        if let Some(well) = &update.tip_used {
            if !self.labware.contains_key(&well.labware_id) {
                return Err(ReduceError::LabwareNotFound(well.labware_id.clone()));
            }
            self.used_tips
                .entry(well.labware_id.clone())
                .or_default()
                .insert(well.well_name.clone());
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&LoadedLabware> {
        self.labware.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &LoadedLabware> {
        self.labware.values()
    }

    pub fn well(&self, labware_id: &str, well_name: &str) -> Option<&WellDefinition> {
        self.labware
            .get(labware_id)
            .and_then(|l| l.definition.wells.get(well_name))
    }

    pub fn is_tiprack(&self, labware_id: &str) -> bool {
        self.labware
            .get(labware_id)
            .is_some_and(|l| l.definition.is_tiprack)
    }

    pub fn is_tip_used(&self, labware_id: &str, well_name: &str) -> bool {
        self.used_tips
            .get(labware_id)
            .is_some_and(|wells| wells.contains(well_name))
    }

    /// Labware stacked directly on the given location
    pub fn occupant_of(&self, location: &LabwareLocation) -> Option<&LoadedLabware> {
        if *location == LabwareLocation::OffDeck {
            return None;
        }
        self.labware.values().find(|l| l.location == *location)
    }
}

#[cfg(test)]
#[path = "labware_tests.rs"]
mod tests;
