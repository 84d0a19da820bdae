// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed parameters for every command type
//!
//! Wire form is `{"commandType": "<tag>", "params": {...}}`.

use crate::types::{DeckSlot, LabwareLocation, ModuleModel, MotorAxis, MountType, Point, WellLocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_namespace() -> String {
    "opentrons".to_string()
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLabwareParams {
    pub load_name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_version")]
    pub version: u32,
    pub location: LabwareLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labware_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPipetteParams {
    pub pipette_name: String,
    pub mount: MountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadModuleParams {
    pub model: ModuleModel,
    pub location: DeckSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefineLiquidParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadLiquidParams {
    pub liquid_id: String,
    pub labware_id: String,
    pub volume_by_well: BTreeMap<String, f64>,
}

/// A pipette addressing a single well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellTarget {
    pub pipette_id: String,
    pub labware_id: String,
    pub well_name: String,
    #[serde(default)]
    pub well_location: WellLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTipParams {
    #[serde(flatten)]
    pub target: WellTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_after: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidHandlingParams {
    #[serde(flatten)]
    pub target: WellTarget,
    pub volume: f64,
    pub flow_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlowOutParams {
    #[serde(flatten)]
    pub target: WellTarget,
    pub flow_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveToCoordinatesParams {
    pub pipette_id: String,
    pub coordinates: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_z_height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axes: Option<Vec<MotorAxis>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForDurationParams {
    pub seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForResumeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentParams {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRailLightsParams {
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub module_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTargetTemperatureParams {
    pub module_id: String,
    pub celsius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngageParams {
    pub module_id: String,
    /// Magnet height above the labware bottom, mm
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetShakeSpeedParams {
    pub module_id: String,
    pub rpm: f64,
}

/// Closed set of command types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "commandType", content = "params", rename_all = "camelCase")]
pub enum CommandParams {
    LoadLabware(LoadLabwareParams),
    LoadPipette(LoadPipetteParams),
    LoadModule(LoadModuleParams),
    DefineLiquid(DefineLiquidParams),
    LoadLiquid(LoadLiquidParams),
    PickUpTip(WellTarget),
    DropTip(DropTipParams),
    Aspirate(LiquidHandlingParams),
    Dispense(LiquidHandlingParams),
    BlowOut(BlowOutParams),
    MoveToWell(WellTarget),
    MoveToCoordinates(MoveToCoordinatesParams),
    Home(HomeParams),
    WaitForDuration(WaitForDurationParams),
    WaitForResume(WaitForResumeParams),
    Comment(CommentParams),
    SetRailLights(SetRailLightsParams),
    #[serde(rename = "temperatureModule/setTargetTemperature")]
    SetTargetTemperature(SetTargetTemperatureParams),
    #[serde(rename = "temperatureModule/deactivate")]
    DeactivateTemperature(ModuleParams),
    #[serde(rename = "magneticModule/engage")]
    EngageMagnet(EngageParams),
    #[serde(rename = "magneticModule/disengage")]
    DisengageMagnet(ModuleParams),
    #[serde(rename = "heaterShaker/setAndWaitForShakeSpeed")]
    SetShakeSpeed(SetShakeSpeedParams),
    #[serde(rename = "heaterShaker/deactivateShaker")]
    DeactivateShaker(ModuleParams),
}

impl CommandParams {
    /// The `commandType` tag
    pub fn command_type(&self) -> &'static str {
        match self {
            CommandParams::LoadLabware(_) => "loadLabware",
            CommandParams::LoadPipette(_) => "loadPipette",
            CommandParams::LoadModule(_) => "loadModule",
            CommandParams::DefineLiquid(_) => "defineLiquid",
            CommandParams::LoadLiquid(_) => "loadLiquid",
            CommandParams::PickUpTip(_) => "pickUpTip",
            CommandParams::DropTip(_) => "dropTip",
            CommandParams::Aspirate(_) => "aspirate",
            CommandParams::Dispense(_) => "dispense",
            CommandParams::BlowOut(_) => "blowOut",
            CommandParams::MoveToWell(_) => "moveToWell",
            CommandParams::MoveToCoordinates(_) => "moveToCoordinates",
            CommandParams::Home(_) => "home",
            CommandParams::WaitForDuration(_) => "waitForDuration",
            CommandParams::WaitForResume(_) => "waitForResume",
            CommandParams::Comment(_) => "comment",
            CommandParams::SetRailLights(_) => "setRailLights",
            CommandParams::SetTargetTemperature(_) => "temperatureModule/setTargetTemperature",
            CommandParams::DeactivateTemperature(_) => "temperatureModule/deactivate",
            CommandParams::EngageMagnet(_) => "magneticModule/engage",
            CommandParams::DisengageMagnet(_) => "magneticModule/disengage",
            CommandParams::SetShakeSpeed(_) => "heaterShaker/setAndWaitForShakeSpeed",
            CommandParams::DeactivateShaker(_) => "heaterShaker/deactivateShaker",
        }
    }

    /// Pipette whose position this command changes, if any.
    ///
    /// After such a command fails the pipette's position is no longer known.
    pub fn moved_pipette(&self) -> Option<&str> {
        match self {
            CommandParams::PickUpTip(target) | CommandParams::MoveToWell(target) => {
                Some(&target.pipette_id)
            }
            CommandParams::DropTip(p) => Some(&p.target.pipette_id),
            CommandParams::Aspirate(p) | CommandParams::Dispense(p) => Some(&p.target.pipette_id),
            CommandParams::BlowOut(p) => Some(&p.target.pipette_id),
            CommandParams::MoveToCoordinates(p) => Some(&p.pipette_id),
            _ => None,
        }
    }
}
