// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders shared by the state tests

use crate::action::Action;
use crate::command::{
    CommandId, CommandIntent, CommandParams, CommandRequest, CommandResult, CommentParams,
    LoadedLabwareUpdate, LoadedPipetteUpdate, StateUpdate,
};
use crate::error::{ErrorCode, ErrorOccurrence};
use crate::recovery::ErrorRecoveryType;
use crate::types::{
    Dimensions, LabwareDefinition, LabwareLocation, MountType, PipetteConfig, WellDefinition,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

pub(crate) fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

pub(crate) fn id(s: &str) -> CommandId {
    CommandId::from(s)
}

pub(crate) fn plate_definition() -> LabwareDefinition {
    let mut wells = BTreeMap::new();
    for (name, x) in [("A1", 14.38), ("A2", 23.38)] {
        wells.insert(
            name.to_string(),
            WellDefinition {
                x,
                y: 74.24,
                z: 1.0,
                depth: 10.5,
                total_liquid_volume: 360.0,
            },
        );
    }
    LabwareDefinition {
        load_name: "test_plate".into(),
        namespace: "test".into(),
        version: 1,
        display_name: "Test Plate".into(),
        dimensions: Dimensions {
            x_dimension: 127.76,
            y_dimension: 85.48,
            z_dimension: 14.22,
        },
        wells,
        is_tiprack: false,
        tip_length: None,
    }
}

pub(crate) fn pipette_config() -> PipetteConfig {
    PipetteConfig {
        model: "p300_single_v2.0".into(),
        channels: 1,
        min_volume: 20.0,
        max_volume: 300.0,
        nominal_tip_overlap: 8.25,
    }
}

pub(crate) fn comment_request(intent: CommandIntent) -> CommandRequest {
    CommandRequest::new(CommandParams::Comment(CommentParams {
        message: "hello".into(),
    }))
    .with_intent(intent)
}

pub(crate) fn queue(command_id: &str) -> Action {
    queue_with_intent(command_id, CommandIntent::Protocol)
}

pub(crate) fn queue_with_intent(command_id: &str, intent: CommandIntent) -> Action {
    Action::QueueCommand {
        command_id: id(command_id),
        created_at: at(0),
        request: comment_request(intent),
    }
}

pub(crate) fn run(command_id: &str) -> Action {
    Action::RunCommand {
        command_id: id(command_id),
        started_at: at(1),
    }
}

pub(crate) fn succeed(command_id: &str) -> Action {
    succeed_with(command_id, StateUpdate::default())
}

pub(crate) fn succeed_with(command_id: &str, state_update: StateUpdate) -> Action {
    Action::SucceedCommand {
        command_id: id(command_id),
        completed_at: at(2),
        result: CommandResult::Empty,
        state_update,
    }
}

pub(crate) fn error_for(command_id: &str) -> ErrorOccurrence {
    ErrorOccurrence::new(
        format!("error-{command_id}"),
        "MotionFailed",
        ErrorCode::MotionFailed,
        "stalled",
        at(2),
    )
    .for_command(id(command_id))
}

pub(crate) fn fail(command_id: &str, recovery: ErrorRecoveryType) -> Action {
    Action::FailCommand {
        command_id: id(command_id),
        failed_at: at(2),
        error: error_for(command_id),
        recovery,
        state_update: StateUpdate::default(),
    }
}

pub(crate) fn play() -> Action {
    Action::Play { requested_at: at(0) }
}

pub(crate) fn load_labware_update(labware_id: &str, location: LabwareLocation) -> StateUpdate {
    StateUpdate {
        loaded_labware: Some(LoadedLabwareUpdate {
            labware_id: labware_id.into(),
            definition: plate_definition(),
            location,
            display_name: None,
        }),
        ..Default::default()
    }
}

pub(crate) fn load_pipette_update(pipette_id: &str, mount: MountType) -> StateUpdate {
    StateUpdate {
        loaded_pipette: Some(LoadedPipetteUpdate {
            pipette_id: pipette_id.into(),
            mount,
            config: pipette_config(),
        }),
        ..Default::default()
    }
}
