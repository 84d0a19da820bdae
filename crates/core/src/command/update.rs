// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Private effects of a command outcome on the equipment sub-states
//!
//! A [`StateUpdate`] travels inside the succeed/fail action so that the
//! equipment reducers stay pure: implementations describe what changed,
//! reducers apply it.

use crate::types::{
    LabwareDefinition, LabwareLocation, ModuleDefinition, MountType, PipetteConfig, Point,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedLabwareUpdate {
    pub labware_id: String,
    pub definition: LabwareDefinition,
    pub location: LabwareLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPipetteUpdate {
    pub pipette_id: String,
    pub mount: MountType,
    pub config: PipetteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedModuleUpdate {
    pub module_id: String,
    pub definition: ModuleDefinition,
    pub location: crate::types::DeckSlot,
}

/// Where a pipette was left by the last command that moved it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labware_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_name: Option<String>,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PipetteLocationUpdate {
    #[serde(rename_all = "camelCase")]
    Moved {
        pipette_id: String,
        location: CurrentLocation,
    },
    /// The pipette may have moved but its position is not known
    #[serde(rename_all = "camelCase")]
    Unknown { pipette_id: String },
    /// Every pipette's position is unknown or was reset by homing
    ClearAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipGeometry {
    pub length: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipUpdate {
    pub pipette_id: String,
    /// `None` when the tip was removed
    pub tip: Option<TipGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeUpdate {
    pub pipette_id: String,
    /// Total volume held after the command, `None` if no tip is attached
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellRef {
    pub labware_id: String,
    pub well_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidDefinedUpdate {
    pub liquid_id: String,
    pub display_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidLoadedUpdate {
    pub liquid_id: String,
    pub labware_id: String,
    pub volume_by_well: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellVolumeUpdate {
    pub labware_id: String,
    pub well_name: String,
    pub volume: f64,
}

/// Live state of a loaded module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ModuleSubstate {
    #[serde(rename_all = "camelCase")]
    Temperature { target_celsius: Option<f64> },
    #[serde(rename_all = "camelCase")]
    Magnetic { engaged_height: Option<f64> },
    #[serde(rename_all = "camelCase")]
    HeaterShaker { target_rpm: Option<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStateUpdate {
    pub module_id: String,
    pub state: ModuleSubstate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_labware: Option<LoadedLabwareUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_pipette: Option<LoadedPipetteUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loaded_module: Option<LoadedModuleUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette_location: Option<PipetteLocationUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette_tip: Option<TipUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette_volume: Option<VolumeUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip_used: Option<WellRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_defined: Option<LiquidDefinedUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_loaded: Option<LiquidLoadedUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub well_volume: Option<WellVolumeUpdate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_state: Option<ModuleStateUpdate>,
    /// Pause the run once this command settles
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pause_requested: bool,
}

impl StateUpdate {
    pub fn is_empty(&self) -> bool {
        *self == StateUpdate::default()
    }

    pub fn moved(mut self, pipette_id: &str, location: CurrentLocation) -> Self {
        self.pipette_location = Some(PipetteLocationUpdate::Moved {
            pipette_id: pipette_id.to_string(),
            location,
        });
        self
    }

    pub fn volume(mut self, pipette_id: &str, volume: Option<f64>) -> Self {
        self.pipette_volume = Some(VolumeUpdate {
            pipette_id: pipette_id.to_string(),
            volume,
        });
        self
    }

    pub fn tip(mut self, pipette_id: &str, tip: Option<TipGeometry>) -> Self {
        self.pipette_tip = Some(TipUpdate {
            pipette_id: pipette_id.to_string(),
            tip,
        });
        self
    }

    pub fn module(mut self, module_id: &str, state: ModuleSubstate) -> Self {
        self.module_state = Some(ModuleStateUpdate {
            module_id: module_id.to_string(),
            state,
        });
        self
    }
}
