// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::types::{DeckSlot, LabwareLocation, MountType, WellOrigin};
use chrono::TimeZone;
use serde_json::json;

#[test]
fn request_parses_wire_form() {
    let request: CommandRequest = serde_json::from_value(json!({
        "commandType": "aspirate",
        "params": {
            "pipetteId": "p1",
            "labwareId": "plate",
            "wellName": "A1",
            "wellLocation": { "origin": "bottom", "offset": { "x": 0.0, "y": 0.0, "z": 1.0 } },
            "volume": 50.0,
            "flowRate": 150.0
        }
    }))
    .unwrap();

    assert_eq!(request.intent, CommandIntent::Protocol);
    assert_eq!(request.key, None);
    let CommandParams::Aspirate(params) = request.params else {
        panic!("expected aspirate, got {:?}", request.params);
    };
    assert_eq!(params.target.pipette_id, "p1");
    assert_eq!(params.target.well_location.origin, WellOrigin::Bottom);
    assert_eq!(params.volume, 50.0);
}

#[test]
fn request_parses_intent_and_key() {
    let request: CommandRequest = serde_json::from_value(json!({
        "commandType": "home",
        "params": {},
        "intent": "setup",
        "key": "home-first"
    }))
    .unwrap();

    assert_eq!(request.intent, CommandIntent::Setup);
    assert_eq!(request.key.as_deref(), Some("home-first"));
    assert_eq!(request.params, CommandParams::Home(HomeParams::default()));
}

#[test]
fn request_parses_module_command_tags() {
    let request: CommandRequest = serde_json::from_value(json!({
        "commandType": "temperatureModule/setTargetTemperature",
        "params": { "moduleId": "temp", "celsius": 4.0 }
    }))
    .unwrap();

    assert_eq!(
        request.params.command_type(),
        "temperatureModule/setTargetTemperature"
    );
}

#[test]
fn request_rejects_unknown_command_type() {
    let result: Result<CommandRequest, _> = serde_json::from_value(json!({
        "commandType": "teleport",
        "params": {}
    }));
    assert!(result.is_err());
}

#[test]
fn load_labware_defaults_namespace_and_version() {
    let request: CommandRequest = serde_json::from_value(json!({
        "commandType": "loadLabware",
        "params": {
            "loadName": "corning_96_wellplate_360ul_flat",
            "location": { "kind": "slot", "slot": 1 }
        }
    }))
    .unwrap();

    let CommandParams::LoadLabware(params) = request.params else {
        panic!("expected loadLabware");
    };
    assert_eq!(params.namespace, "opentrons");
    assert_eq!(params.version, 1);
    assert_eq!(params.location, LabwareLocation::Slot { slot: DeckSlot(1) });
}

#[test]
fn queued_command_defaults_key_to_id() {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let request = CommandRequest::new(CommandParams::LoadPipette(LoadPipetteParams {
        pipette_name: "p300_single_gen2".into(),
        mount: MountType::Left,
        pipette_id: None,
    }));

    let command = Command::queued(CommandId::from("cmd-1"), &request, at);

    assert_eq!(command.key, "cmd-1");
    assert_eq!(command.status, CommandStatus::Queued);
    assert_eq!(command.command_type(), "loadPipette");
}

#[test]
fn command_serializes_type_tag_at_top_level() {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let request = CommandRequest::new(CommandParams::Comment(CommentParams {
        message: "hello".into(),
    }))
    .with_key("greeting");
    let command = Command::queued(CommandId::from("cmd-1"), &request, at);

    let json = serde_json::to_value(&command).unwrap();
    assert_eq!(json["commandType"], "comment");
    assert_eq!(json["params"]["message"], "hello");
    assert_eq!(json["key"], "greeting");

    let back: Command = serde_json::from_value(json).unwrap();
    assert_eq!(back, command);
}

#[test]
fn moved_pipette_covers_motion_commands_only() {
    let comment = CommandParams::Comment(CommentParams {
        message: "x".into(),
    });
    assert_eq!(comment.moved_pipette(), None);

    let move_to = CommandParams::MoveToWell(WellTarget {
        pipette_id: "p1".into(),
        labware_id: "plate".into(),
        well_name: "A1".into(),
        well_location: Default::default(),
    });
    assert_eq!(move_to.moved_pipette(), Some("p1"));
}
