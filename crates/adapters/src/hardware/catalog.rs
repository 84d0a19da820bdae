// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Built-in labware, pipette, and module definitions
//!
//! Enough of the standard library for the simulator to run common protocols.

use pe_core::types::{
    Dimensions, LabwareDefinition, ModuleDefinition, ModuleModel, PipetteConfig, Point,
    WellDefinition,
};
use std::collections::BTreeMap;

pub const DEFAULT_NAMESPACE: &str = "opentrons";

const ROWS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

struct Grid {
    rows: usize,
    columns: usize,
    first: (f64, f64),
    pitch: f64,
    z: f64,
    depth: f64,
    volume: f64,
}

fn grid_wells(grid: &Grid) -> BTreeMap<String, WellDefinition> {
    let mut wells = BTreeMap::new();
    for (r, row) in ROWS.iter().take(grid.rows).enumerate() {
        for column in 0..grid.columns {
            wells.insert(
                format!("{row}{}", column + 1),
                WellDefinition {
                    x: grid.first.0 + grid.pitch * column as f64,
                    y: grid.first.1 - grid.pitch * r as f64,
                    z: grid.z,
                    depth: grid.depth,
                    total_liquid_volume: grid.volume,
                },
            );
        }
    }
    wells
}

fn definition(
    load_name: &str,
    display_name: &str,
    dimensions: Dimensions,
    wells: BTreeMap<String, WellDefinition>,
    tip_length: Option<f64>,
) -> LabwareDefinition {
    LabwareDefinition {
        load_name: load_name.to_string(),
        namespace: DEFAULT_NAMESPACE.to_string(),
        version: 1,
        display_name: display_name.to_string(),
        dimensions,
        wells,
        is_tiprack: tip_length.is_some(),
        tip_length,
    }
}

const SBS_FOOTPRINT: (f64, f64) = (127.76, 85.48);

fn tiprack(load_name: &str, display_name: &str, height: f64, tip_length: f64, volume: f64) -> LabwareDefinition {
    let wells = grid_wells(&Grid {
        rows: 8,
        columns: 12,
        first: (14.38, 74.24),
        pitch: 9.0,
        z: height - tip_length,
        depth: tip_length,
        volume,
    });
    definition(
        load_name,
        display_name,
        Dimensions {
            x_dimension: SBS_FOOTPRINT.0,
            y_dimension: SBS_FOOTPRINT.1,
            z_dimension: height,
        },
        wells,
        Some(tip_length),
    )
}

/// Look up a labware definition by load name, namespace, and version
pub fn labware(load_name: &str, namespace: &str, version: u32) -> Option<LabwareDefinition> {
    if namespace != DEFAULT_NAMESPACE || version != 1 {
        return None;
    }
    let definition = match load_name {
        "corning_96_wellplate_360ul_flat" => definition(
            load_name,
            "Corning 96 Well Plate 360 µL Flat",
            Dimensions {
                x_dimension: SBS_FOOTPRINT.0,
                y_dimension: SBS_FOOTPRINT.1,
                z_dimension: 14.22,
            },
            grid_wells(&Grid {
                rows: 8,
                columns: 12,
                first: (14.38, 74.24),
                pitch: 9.0,
                z: 3.55,
                depth: 10.67,
                volume: 360.0,
            }),
            None,
        ),
        "nest_12_reservoir_15ml" => definition(
            load_name,
            "NEST 12 Well Reservoir 15 mL",
            Dimensions {
                x_dimension: SBS_FOOTPRINT.0,
                y_dimension: SBS_FOOTPRINT.1,
                z_dimension: 31.4,
            },
            grid_wells(&Grid {
                rows: 1,
                columns: 12,
                first: (14.38, 42.78),
                pitch: 9.0,
                z: 4.55,
                depth: 26.85,
                volume: 15000.0,
            }),
            None,
        ),
        "opentrons_1_trash_1100ml_fixed" => {
            let mut wells = BTreeMap::new();
            wells.insert(
                "A1".to_string(),
                WellDefinition {
                    x: 82.84,
                    y: 80.0,
                    z: 5.0,
                    depth: 77.0,
                    total_liquid_volume: 1_100_000.0,
                },
            );
            definition(
                load_name,
                "Opentrons Fixed Trash",
                Dimensions {
                    x_dimension: 172.86,
                    y_dimension: 165.86,
                    z_dimension: 82.0,
                },
                wells,
                None,
            )
        }
        "opentrons_96_tiprack_300ul" => {
            tiprack(load_name, "Opentrons 96 Tip Rack 300 µL", 64.49, 59.3, 300.0)
        }
        "opentrons_96_tiprack_20ul" => {
            tiprack(load_name, "Opentrons 96 Tip Rack 20 µL", 64.69, 39.2, 20.0)
        }
        _ => return None,
    };
    Some(definition)
}

/// Static configuration for a pipette model name
pub fn pipette(pipette_name: &str) -> Option<PipetteConfig> {
    let (min_volume, max_volume) = match pipette_name {
        "p20_single_gen2" => (1.0, 20.0),
        "p300_single_gen2" => (20.0, 300.0),
        "p1000_single_gen2" => (100.0, 1000.0),
        _ => return None,
    };
    Some(PipetteConfig {
        model: pipette_name.to_string(),
        channels: 1,
        min_volume,
        max_volume,
        nominal_tip_overlap: 8.25,
    })
}

pub fn module(model: ModuleModel) -> ModuleDefinition {
    let (display_name, dimensions, labware_offset) = match model {
        ModuleModel::TemperatureModuleV2 => (
            "Temperature Module GEN2",
            Dimensions {
                x_dimension: 194.0,
                y_dimension: 90.0,
                z_dimension: 84.0,
            },
            Point::new(-1.45, -0.15, 80.09),
        ),
        ModuleModel::MagneticModuleV2 => (
            "Magnetic Module GEN2",
            Dimensions {
                x_dimension: 137.0,
                y_dimension: 90.0,
                z_dimension: 110.0,
            },
            Point::new(-1.175, -0.125, 82.25),
        ),
        ModuleModel::HeaterShakerModuleV1 => (
            "Heater-Shaker Module GEN1",
            Dimensions {
                x_dimension: 152.0,
                y_dimension: 90.5,
                z_dimension: 82.0,
            },
            Point::new(-0.125, 1.125, 68.275),
        ),
    };
    ModuleDefinition {
        model,
        display_name: display_name.to_string(),
        dimensions,
        labware_offset,
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
