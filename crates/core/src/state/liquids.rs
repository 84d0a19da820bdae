// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Defined liquids and known well volumes

use crate::command::StateUpdate;
use crate::error::ReduceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liquid {
    pub id: String,
    pub display_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
}

/// Liquid known to be in a well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellLiquid {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_id: Option<String>,
    pub volume: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidState {
    liquids: BTreeMap<String, Liquid>,
    wells: BTreeMap<String, BTreeMap<String, WellLiquid>>,
}

impl LiquidState {
    pub(crate) fn apply(&mut self, update: &StateUpdate) -> Result<(), ReduceError> {
        if let Some(defined) = &update.liquid_defined {
            self.liquids.insert(
                defined.liquid_id.clone(),
                Liquid {
                    id: defined.liquid_id.clone(),
                    display_name: defined.display_name.clone(),
                    description: defined.description.clone(),
                    display_color: defined.display_color.clone(),
                },
            );
        }
        if let Some(loaded) = &update.liquid_loaded {
            if !self.liquids.contains_key(&loaded.liquid_id) {
                return Err(ReduceError::LiquidNotFound(loaded.liquid_id.clone()));
            }
            let wells = self.wells.entry(loaded.labware_id.clone()).or_default();
            for (well, volume) in &loaded.volume_by_well {
                wells.insert(
                    well.clone(),
                    WellLiquid {
                        liquid_id: Some(loaded.liquid_id.clone()),
                        volume: *volume,
                    },
                );
            }
        }
        if let Some(change) = &update.well_volume {
            let well = self
                .wells
                .entry(change.labware_id.clone())
                .or_default()
                .entry(change.well_name.clone())
                .or_insert(WellLiquid {
                    liquid_id: None,
                    volume: 0.0,
                });
            well.volume = change.volume;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Liquid> {
        self.liquids.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &Liquid> {
        self.liquids.values()
    }

    pub fn well(&self, labware_id: &str, well_name: &str) -> Option<&WellLiquid> {
        self.wells.get(labware_id).and_then(|w| w.get(well_name))
    }

    /// Known volume in a well, `None` when nothing was ever loaded there
    pub fn well_volume(&self, labware_id: &str, well_name: &str) -> Option<f64> {
        self.well(labware_id, well_name).map(|w| w.volume)
    }
}

#[cfg(test)]
#[path = "liquids_tests.rs"]
mod tests;
