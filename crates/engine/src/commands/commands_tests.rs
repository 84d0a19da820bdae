// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fixtures::{target, Bench};
use super::*;
use pe_adapters::HardwareError;
use pe_core::command::{CommentParams, HomeParams, SetRailLightsParams, WaitForResumeParams};

#[tokio::test]
async fn state_only_commands_touch_no_hardware() {
    let mut bench = Bench::new();
    let success = bench
        .run(CommandParams::Comment(CommentParams {
            message: "hello".into(),
        }))
        .await
        .unwrap();

    assert_eq!(success.result, CommandResult::Empty);
    assert!(success.state_update.is_empty());
    assert!(bench.hw.calls().is_empty());
}

#[tokio::test]
async fn wait_for_resume_requests_a_pause() {
    let mut bench = Bench::new();
    let success = bench
        .run(CommandParams::WaitForResume(WaitForResumeParams::default()))
        .await
        .unwrap();
    assert!(success.state_update.pause_requested);
    assert!(bench.hw.calls().is_empty());
}

#[tokio::test]
async fn each_command_drives_only_its_capability() {
    let mut bench = Bench::new();
    bench
        .run(CommandParams::SetRailLights(SetRailLightsParams { on: true }))
        .await
        .unwrap();
    bench
        .run(CommandParams::Home(HomeParams::default()))
        .await
        .unwrap();
    assert_eq!(bench.hw.ops(), vec!["set_rail_lights", "home"]);
}

#[tokio::test]
async fn hardware_errors_become_command_errors() {
    let mut bench = Bench::new();
    bench
        .hw
        .fail_next("home", HardwareError::Homing("limit switch".into()));

    let err = bench
        .run(CommandParams::Home(HomeParams::default()))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        CommandError::Hardware(HardwareError::Homing("limit switch".into()))
    );
    assert_eq!(err.error_type(), "HomingFailedError");
}

#[tokio::test]
async fn well_targets_are_checked_before_moving() {
    let mut bench = Bench::with_deck().await;
    let before = bench.hw.calls().len();

    let missing_labware = bench
        .run(CommandParams::MoveToWell(target("nowhere", "A1")))
        .await
        .unwrap_err();
    assert_eq!(missing_labware, CommandError::LabwareNotLoaded("nowhere".into()));

    let missing_well = bench
        .run(CommandParams::MoveToWell(target("plate", "Z99")))
        .await
        .unwrap_err();
    assert!(matches!(missing_well, CommandError::WellNotFound { .. }));

    assert_eq!(bench.hw.calls().len(), before);
}
