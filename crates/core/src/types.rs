// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deck geometry and equipment definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Add;

/// A point in deck coordinates, millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

/// Pipette mount on the gantry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MountType {
    Left,
    Right,
}

impl fmt::Display for MountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountType::Left => write!(f, "left"),
            MountType::Right => write!(f, "right"),
        }
    }
}

/// Motor axes that can be homed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MotorAxis {
    X,
    Y,
    LeftZ,
    RightZ,
    LeftPlunger,
    RightPlunger,
}

/// Deck slot number, 1 through 12 on a three-by-four grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckSlot(pub u8);

impl DeckSlot {
    pub const COUNT: u8 = 12;
    const PITCH_X: f64 = 132.5;
    const PITCH_Y: f64 = 90.5;

    /// Front-left corner of the slot, or `None` for slots off the grid
    pub fn origin(self) -> Option<Point> {
        if self.0 == 0 || self.0 > Self::COUNT {
            return None;
        }
        let index = u32::from(self.0 - 1);
        let col = f64::from(index % 3);
        let row = f64::from(index / 3);
        Some(Point::new(col * Self::PITCH_X, row * Self::PITCH_Y, 0.0))
    }
}

impl fmt::Display for DeckSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a piece of labware sits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LabwareLocation {
    Slot {
        slot: DeckSlot,
    },
    Module {
        #[serde(rename = "moduleId")]
        module_id: String,
    },
    Labware {
        #[serde(rename = "labwareId")]
        labware_id: String,
    },
    OffDeck,
}

/// Reference point within a well
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WellOrigin {
    #[default]
    Top,
    Bottom,
    Center,
}

/// A position relative to a well
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WellLocation {
    #[serde(default)]
    pub origin: WellOrigin,
    #[serde(default)]
    pub offset: Point,
}

impl WellLocation {
    pub fn bottom(z: f64) -> Self {
        Self {
            origin: WellOrigin::Bottom,
            offset: Point::new(0.0, 0.0, z),
        }
    }
}

/// Outer dimensions of a piece of equipment
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    pub x_dimension: f64,
    pub y_dimension: f64,
    pub z_dimension: f64,
}

/// A single well; `x`/`y`/`z` locate the bottom centre relative to the
/// labware's front-left-bottom corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WellDefinition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub depth: f64,
    pub total_liquid_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabwareDefinition {
    pub load_name: String,
    pub namespace: String,
    pub version: u32,
    pub display_name: String,
    pub dimensions: Dimensions,
    pub wells: BTreeMap<String, WellDefinition>,
    #[serde(default)]
    pub is_tiprack: bool,
    #[serde(default)]
    pub tip_length: Option<f64>,
}

/// Static configuration of a pipette model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteConfig {
    pub model: String,
    pub channels: u32,
    pub min_volume: f64,
    pub max_volume: f64,
    pub nominal_tip_overlap: f64,
}

/// Supported hardware module models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleModel {
    TemperatureModuleV2,
    MagneticModuleV2,
    HeaterShakerModuleV1,
}

impl ModuleModel {
    pub fn module_type(self) -> ModuleType {
        match self {
            ModuleModel::TemperatureModuleV2 => ModuleType::Temperature,
            ModuleModel::MagneticModuleV2 => ModuleType::Magnetic,
            ModuleModel::HeaterShakerModuleV1 => ModuleType::HeaterShaker,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleType {
    Temperature,
    Magnetic,
    HeaterShaker,
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleType::Temperature => write!(f, "temperature module"),
            ModuleType::Magnetic => write!(f, "magnetic module"),
            ModuleType::HeaterShaker => write!(f, "heater-shaker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDefinition {
    pub model: ModuleModel,
    pub display_name: String,
    pub dimensions: Dimensions,
    /// Where labware sits relative to the slot origin
    pub labware_offset: Point,
}

/// Front door state as reported by hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DoorState {
    Open,
    Closed,
}
