// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Public results of successful commands

use crate::types::{ModuleModel, Point};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommandResult {
    #[serde(rename_all = "camelCase")]
    LoadedLabware { labware_id: String },
    #[serde(rename_all = "camelCase")]
    LoadedPipette { pipette_id: String },
    #[serde(rename_all = "camelCase")]
    LoadedModule {
        module_id: String,
        model: ModuleModel,
    },
    #[serde(rename_all = "camelCase")]
    DefinedLiquid { liquid_id: String },
    #[serde(rename_all = "camelCase")]
    PickedUpTip {
        tip_volume: f64,
        tip_length: f64,
        position: Point,
    },
    /// Aspirate and dispense report the volume moved
    #[serde(rename_all = "camelCase")]
    Volume { volume: f64, position: Point },
    Moved { position: Point },
    Empty,
}

impl CommandResult {
    /// Final pipette position, for results that report one
    pub fn position(&self) -> Option<Point> {
        match self {
            CommandResult::PickedUpTip { position, .. }
            | CommandResult::Volume { position, .. }
            | CommandResult::Moved { position } => Some(*position),
            _ => None,
        }
    }
}
