// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::commands::fixtures::liquid;
use crate::controller::RunController;
use crate::test_support::{comment, dispatcher, settled, transfer_setup, wait, within, TestDispatcher};
use pe_adapters::{FakeHardware, HardwareCall, HardwareError};
use pe_core::command::{HomeParams, SetRailLightsParams};
use pe_core::{CommandId, CommandRequest, FakeClock, MountType, RunResult, RunStatus};

fn settings() -> WorkerSettings {
    WorkerSettings::from(&EngineConfig::default())
}

fn spawn(
    dispatcher: &Arc<TestDispatcher>,
    hw: &FakeHardware,
    settings: WorkerSettings,
) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    let worker = Worker::new(Arc::clone(dispatcher), hw.clone(), settings, tx);
    tokio::spawn(worker.run());
    rx
}

async fn finished(mut rx: watch::Receiver<bool>) {
    within(rx.wait_for(|done| *done))
        .await
        .map(|_| ())
        .unwrap();
}

fn queue_all(dispatcher: &Arc<TestDispatcher>, requests: Vec<CommandRequest>) -> Vec<CommandId> {
    let controller = RunController::new(Arc::clone(dispatcher));
    requests
        .into_iter()
        .map(|r| controller.add_command(r).unwrap())
        .collect()
}

fn play(dispatcher: &Arc<TestDispatcher>) {
    RunController::new(Arc::clone(dispatcher)).play().unwrap();
}

fn occurrence(id: &str, code: ErrorCode) -> ErrorOccurrence {
    ErrorOccurrence::new(id, "TestError", code, "injected", FakeClock::new().now())
}

#[tokio::test]
async fn runs_commands_in_queue_order_then_finishes() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    let done = spawn(&dispatcher, &hw, settings());
    let ids = queue_all(
        &dispatcher,
        vec![
            CommandRequest::new(CommandParams::Home(HomeParams { axes: None })),
            CommandRequest::new(CommandParams::SetRailLights(SetRailLightsParams { on: true })),
            wait(0.0),
        ],
    );
    play(&dispatcher);
    finished(done).await;

    let state = dispatcher.state();
    assert_eq!(state.status(), RunStatus::Succeeded);
    for id in &ids {
        assert_eq!(state.commands.get(id).unwrap().status, CommandStatus::Succeeded);
    }
    // The last home is post-run cleanup
    assert_eq!(
        hw.ops(),
        vec!["home", "set_rail_lights", "wait_for_duration", "home"]
    );
}

#[tokio::test]
async fn protocol_commands_wait_for_play() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    let _done = spawn(&dispatcher, &hw, settings());
    let ids = queue_all(&dispatcher, vec![wait(0.0)]);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(hw.ops().is_empty());
    assert_eq!(
        dispatcher.state().commands.get(&ids[0]).unwrap().status,
        CommandStatus::Queued
    );

    play(&dispatcher);
    let state = settled(&dispatcher, |s| s.commands.all_final()).await;
    assert_eq!(state.commands.get(&ids[0]).unwrap().status, CommandStatus::Succeeded);
}

#[tokio::test]
async fn slow_command_times_out() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    hw.hold_waits();
    let _done = spawn(
        &dispatcher,
        &hw,
        WorkerSettings {
            command_timeout: Duration::from_millis(50),
            ..settings()
        },
    );
    let ids = queue_all(&dispatcher, vec![wait(30.0), comment("after")]);
    play(&dispatcher);

    let state = settled(&dispatcher, |s| s.status() == RunStatus::AwaitingRecovery).await;
    let timed_out = state.commands.get(&ids[0]).unwrap();
    assert_eq!(timed_out.status, CommandStatus::Failed);
    let error = timed_out.error.as_ref().unwrap();
    assert_eq!(error.error_code, ErrorCode::CommandTimedOut);
    assert_eq!(error.command_id.as_ref(), Some(&ids[0]));
    assert_eq!(state.commands.get(&ids[1]).unwrap().status, CommandStatus::Queued);
}

#[tokio::test]
async fn hardware_failure_fails_the_command_with_the_policy_recovery() {
    let dispatcher = dispatcher();
    dispatcher
        .dispatch(Action::SetErrorRecoveryPolicy {
            policy: pe_core::ErrorRecoveryPolicy::new(pe_core::ErrorRecoveryType::FailRun),
        })
        .unwrap();
    let hw = FakeHardware::new();
    hw.fail_next("home", HardwareError::Homing("limit switch".into()));
    let done = spawn(&dispatcher, &hw, settings());
    let ids = queue_all(
        &dispatcher,
        vec![
            CommandRequest::new(CommandParams::Home(HomeParams { axes: None })),
            comment("never"),
        ],
    );
    play(&dispatcher);
    finished(done).await;

    let state = dispatcher.state();
    assert_eq!(state.status(), RunStatus::Failed);
    assert_eq!(state.commands.get(&ids[0]).unwrap().status, CommandStatus::Failed);
    assert_eq!(state.commands.get(&ids[1]).unwrap().status, CommandStatus::Failed);
    assert_eq!(
        state.run_error().and_then(|e| e.command_id.as_ref()),
        Some(&ids[0])
    );
}

#[tokio::test]
async fn cleanup_drops_tips_in_place_and_homes() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    let done = spawn(&dispatcher, &hw, settings());
    queue_all(&dispatcher, transfer_setup());
    play(&dispatcher);
    finished(done).await;

    assert_eq!(dispatcher.state().status(), RunStatus::Succeeded);
    let calls = hw.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        [
            HardwareCall::DropTip {
                mount: MountType::Left,
                home_after: false,
            },
            HardwareCall::Home { axes: None },
        ]
    );
}

#[tokio::test]
async fn cleanup_can_be_turned_off() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    let done = spawn(
        &dispatcher,
        &hw,
        WorkerSettings {
            drop_tips_after_run: false,
            home_after_run: false,
            ..settings()
        },
    );
    queue_all(&dispatcher, transfer_setup());
    play(&dispatcher);
    finished(done).await;

    let ops = hw.ops();
    assert!(!ops.contains(&"drop_tip"));
    assert!(!ops.contains(&"home"));
    assert_eq!(dispatcher.state().status(), RunStatus::Succeeded);
}

#[tokio::test]
async fn cleanup_failures_are_collected_into_one_finish_error() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    hw.fail_next("drop_tip", HardwareError::Pipetting("tip stuck".into()));
    hw.fail_next("home", HardwareError::Homing("limit switch".into()));
    let done = spawn(&dispatcher, &hw, settings());
    queue_all(&dispatcher, transfer_setup());
    play(&dispatcher);
    finished(done).await;

    let state = dispatcher.state();
    assert_eq!(state.status(), RunStatus::Failed);
    assert_eq!(state.run.result(), Some(RunResult::Succeeded));
    let error = state.run.finish_error().unwrap();
    assert_eq!(error.error_type, "PostRunCleanupError");
    assert_eq!(error.error_code, ErrorCode::RoboticsControlError);
    assert_eq!(error.wrapped_errors.len(), 2);
}

#[tokio::test]
async fn estop_skips_cleanup() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    let done = spawn(
        &dispatcher,
        &hw,
        WorkerSettings {
            finish_when_drained: false,
            ..settings()
        },
    );
    queue_all(&dispatcher, transfer_setup());
    play(&dispatcher);
    settled(&dispatcher, |s| s.commands.all_final()).await;
    let before = hw.ops().len();

    dispatcher
        .dispatch(Action::Stop {
            requested_at: dispatcher.clock().now(),
            estop: Some(occurrence("estop", ErrorCode::EStopActivated)),
        })
        .unwrap();
    finished(done).await;

    let state = dispatcher.state();
    assert_eq!(state.status(), RunStatus::Failed);
    assert!(state.run.stopped_by_estop());
    assert_eq!(hw.ops().len(), before);
}

#[tokio::test]
async fn outcome_is_dropped_when_the_command_was_faulted_meanwhile() {
    let dispatcher = dispatcher();
    let hw = FakeHardware::new();
    hw.hold_waits();
    let done = spawn(&dispatcher, &hw, settings());
    let ids = queue_all(&dispatcher, vec![wait(1.0)]);
    play(&dispatcher);
    settled(&dispatcher, |s| s.commands.running_id().is_some()).await;

    dispatcher
        .dispatch(Action::EngineFault {
            error: occurrence("fault", ErrorCode::EngineFault),
            completed_at: None,
        })
        .unwrap();
    hw.release_wait();
    finished(done).await;

    let state = dispatcher.state();
    assert_eq!(state.status(), RunStatus::Failed);
    let command = state.commands.get(&ids[0]).unwrap();
    assert_eq!(command.status, CommandStatus::Failed);
    assert_eq!(command.error.as_ref().map(|e| e.id.as_str()), Some("fault"));
}

#[test]
fn failed_home_forgets_every_position() {
    let update = failure_update(&CommandParams::Home(HomeParams { axes: None }));
    assert_eq!(update.pipette_location, Some(PipetteLocationUpdate::ClearAll));
}

#[test]
fn failed_motion_marks_the_pipette_position_unknown() {
    let update = failure_update(&CommandParams::Aspirate(liquid(10.0)));
    assert_eq!(
        update.pipette_location,
        Some(PipetteLocationUpdate::Unknown {
            pipette_id: "pip".into()
        })
    );
}

#[test]
fn failures_without_motion_change_nothing() {
    assert_eq!(
        failure_update(&comment("x").params),
        StateUpdate::default()
    );
}
