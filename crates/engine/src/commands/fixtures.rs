// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared setup for command tests

use super::{execute, SuccessData};
use crate::error::CommandError;
use pe_adapters::FakeHardware;
use pe_core::command::{
    DefineLiquidParams, LiquidHandlingParams, LoadLabwareParams, LoadLiquidParams,
    LoadPipetteParams, WellTarget,
};
use pe_core::types::{DeckSlot, LabwareLocation, WellLocation};
use pe_core::{
    Action, Clock, CommandId, CommandParams, CommandRequest, FakeClock, MountType,
    SequentialIdGen, State, StateConfig,
};
use std::collections::BTreeMap;

pub(crate) const TIPRACK: &str = "opentrons_96_tiprack_300ul";
pub(crate) const PLATE: &str = "corning_96_wellplate_360ul_flat";
pub(crate) const PIPETTE: &str = "p300_single_gen2";

/// A state plus fake hardware. Successful commands are folded into the
/// state through the reducers, the way the worker would.
pub(crate) struct Bench {
    pub state: State,
    pub hw: FakeHardware,
    pub ids: SequentialIdGen,
    clock: FakeClock,
    executed: usize,
}

impl Bench {
    pub fn new() -> Self {
        Self {
            state: State::new(&StateConfig::default()),
            hw: FakeHardware::new(),
            ids: SequentialIdGen::new("gen"),
            clock: FakeClock::new(),
            executed: 0,
        }
    }

    /// Pipette `pip` on the left, tip rack `tips` in slot 1, plate `plate`
    /// in slot 2 with 100 µL of `water` in A1
    pub async fn with_deck() -> Self {
        let mut bench = Self::new();
        bench.run(load_pipette("pip", MountType::Left)).await.unwrap();
        bench.run(load_labware("tips", TIPRACK, 1)).await.unwrap();
        bench.run(load_labware("plate", PLATE, 2)).await.unwrap();
        bench
            .run(CommandParams::DefineLiquid(DefineLiquidParams {
                liquid_id: Some("water".into()),
                display_name: "Water".into(),
                description: String::new(),
                display_color: None,
            }))
            .await
            .unwrap();
        bench
            .run(CommandParams::LoadLiquid(LoadLiquidParams {
                liquid_id: "water".into(),
                labware_id: "plate".into(),
                volume_by_well: BTreeMap::from([("A1".to_string(), 100.0)]),
            }))
            .await
            .unwrap();
        bench
    }

    /// As [`Bench::with_deck`], with a tip already on `pip`
    pub async fn with_tip() -> Self {
        let mut bench = Self::with_deck().await;
        bench
            .run(CommandParams::PickUpTip(target("tips", "A1")))
            .await
            .unwrap();
        bench
    }

    pub async fn run(&mut self, params: CommandParams) -> Result<SuccessData, CommandError> {
        let outcome = execute(&params, &self.state, &self.hw, &self.ids).await;
        if let Ok(success) = &outcome {
            self.apply(params, success.clone());
        }
        outcome
    }

    fn apply(&mut self, params: CommandParams, success: SuccessData) {
        self.executed += 1;
        let command_id = CommandId::from(format!("cmd-{}", self.executed));
        let now = self.clock.now();
        let actions = [
            Action::QueueCommand {
                command_id: command_id.clone(),
                created_at: now,
                request: CommandRequest::new(params),
            },
            Action::RunCommand {
                command_id: command_id.clone(),
                started_at: now,
            },
            Action::SucceedCommand {
                command_id,
                completed_at: now,
                result: success.result,
                state_update: success.state_update,
            },
        ];
        for action in &actions {
            self.state = self.state.reduce(action).unwrap();
        }
    }
}

pub(crate) fn load_pipette(pipette_id: &str, mount: MountType) -> CommandParams {
    CommandParams::LoadPipette(LoadPipetteParams {
        pipette_name: PIPETTE.into(),
        mount,
        pipette_id: Some(pipette_id.into()),
    })
}

pub(crate) fn load_labware(labware_id: &str, load_name: &str, slot: u8) -> CommandParams {
    CommandParams::LoadLabware(LoadLabwareParams {
        load_name: load_name.into(),
        namespace: "opentrons".into(),
        version: 1,
        location: LabwareLocation::Slot {
            slot: DeckSlot(slot),
        },
        labware_id: Some(labware_id.into()),
        display_name: None,
    })
}

/// Pipette `pip` at the top of a well
pub(crate) fn target(labware_id: &str, well_name: &str) -> WellTarget {
    WellTarget {
        pipette_id: "pip".into(),
        labware_id: labware_id.into(),
        well_name: well_name.into(),
        well_location: WellLocation::default(),
    }
}

pub(crate) fn liquid(volume: f64) -> LiquidHandlingParams {
    LiquidHandlingParams {
        target: target("plate", "A1"),
        volume,
        flow_rate: 50.0,
    }
}
