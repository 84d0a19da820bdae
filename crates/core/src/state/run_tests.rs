// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::super::fixtures::*;
use super::*;
use crate::action::PauseSource;
use crate::error::{ErrorCode, ErrorOccurrence};
use crate::state::StateConfig;
use yare::parameterized;

fn fresh() -> RunState {
    RunState::new(true, ErrorRecoveryPolicy::default())
}

fn apply_all(run: &mut RunState, commands: &CommandState, actions: &[Action]) {
    for action in actions {
        run.apply(action, commands);
    }
}

fn stop() -> Action {
    Action::Stop {
        requested_at: at(5),
        estop: None,
    }
}

fn hardware_stopped() -> Action {
    Action::HardwareStopped {
        completed_at: at(6),
        finish_error: None,
    }
}

#[test]
fn starts_ready_in_setup() {
    let run = fresh();
    assert_eq!(run.status(), RunStatus::Ready);
    assert_eq!(run.queue_status(), QueueStatus::Setup);
    assert!(!run.is_stopping());
    assert!(run.started_at().is_none());
}

#[test]
fn first_play_records_start_time_once() {
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            Action::Pause {
                source: PauseSource::Client,
            },
            Action::Play {
                requested_at: at(30),
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::Running);
    assert_eq!(run.started_at(), Some(at(0)));
}

#[test]
fn play_with_door_open_in_setup_stays_paused() {
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            Action::DoorChange {
                door: DoorState::Open,
            },
            play(),
        ],
    );
    assert_eq!(run.status(), RunStatus::BlockedByOpenDoor);
}

#[test]
fn pause_during_recovery_is_recovery_paused() {
    let mut commands = CommandState::default();
    for action in [queue("a"), run("a")] {
        commands.apply(&action).unwrap();
    }
    let mut run = fresh();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            fail("a", ErrorRecoveryType::WaitForRecovery),
            Action::Pause {
                source: PauseSource::Client,
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::AwaitingRecoveryPaused);
    assert!(run.has_entered_recovery());

    run.apply(&play(), &commands);
    assert_eq!(run.status(), RunStatus::AwaitingRecovery);
}

#[test]
fn fixit_failure_does_not_touch_the_run() {
    let mut commands = CommandState::default();
    for action in [queue_with_intent("f", CommandIntent::Fixit), run("f")] {
        commands.apply(&action).unwrap();
    }
    let mut run = fresh();
    apply_all(
        &mut run,
        &commands,
        &[play(), fail("f", ErrorRecoveryType::FailRun)],
    );
    assert_eq!(run.status(), RunStatus::Running);
    assert!(run.run_error().is_none());
}

#[test]
fn first_result_wins() {
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            stop(),
            Action::Finish {
                error: None,
                set_run_status: true,
            },
            hardware_stopped(),
        ],
    );
    assert_eq!(run.status(), RunStatus::Stopped);
    assert_eq!(run.completed_at(), Some(at(6)));
}

#[test]
fn stop_after_stop_requested_is_a_no_op() {
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(&mut run, &commands, &[play(), stop()]);
    let before = run.clone();
    run.apply(&stop(), &commands);
    assert_eq!(run, before);
}

#[test]
fn failed_cleanup_fails_a_succeeded_run() {
    let error = ErrorOccurrence::new("cleanup", "HomingFailed", ErrorCode::HomingFailed, "stalled", at(6));
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            Action::Finish {
                error: None,
                set_run_status: true,
            },
            Action::HardwareStopped {
                completed_at: at(6),
                finish_error: Some(error.clone()),
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::Failed);
    assert_eq!(run.result(), Some(RunResult::Succeeded));
    assert_eq!(run.finish_error(), Some(&error));
    assert!(run.run_error().is_none());
}

#[test]
fn failed_cleanup_fails_a_stopped_run() {
    let error = ErrorOccurrence::new("cleanup", "HomingFailed", ErrorCode::HomingFailed, "stalled", at(6));
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            stop(),
            Action::HardwareStopped {
                completed_at: at(6),
                finish_error: Some(error),
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::Failed);
}

#[test]
fn fault_on_the_final_action_still_completes_the_run() {
    let error = ErrorOccurrence::new("fault", "EngineFault", ErrorCode::EngineFault, "disk full", at(6));
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            Action::Finish {
                error: None,
                set_run_status: true,
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::Finishing);

    run.apply(
        &Action::EngineFault {
            error: error.clone(),
            completed_at: Some(at(7)),
        },
        &commands,
    );
    assert_eq!(run.status(), RunStatus::Failed);
    assert_eq!(run.completed_at(), Some(at(7)));
    assert_eq!(run.run_error(), Some(&error));
}

#[test]
fn fault_mid_run_leaves_completion_to_cleanup() {
    let error = ErrorOccurrence::new("fault", "EngineFault", ErrorCode::EngineFault, "boom", at(3));
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            Action::EngineFault {
                error,
                completed_at: None,
            },
        ],
    );
    assert_eq!(run.status(), RunStatus::StopRequested);
    run.apply(&hardware_stopped(), &commands);
    assert_eq!(run.status(), RunStatus::Failed);
}

#[test]
fn configure_replaces_the_starting_settings() {
    let policy = ErrorRecoveryPolicy::new(ErrorRecoveryType::IgnoreAndContinue);
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            Action::Configure {
                config: StateConfig {
                    block_on_door_open: false,
                    error_recovery_policy: policy.clone(),
                },
            },
            play(),
            Action::DoorChange {
                door: DoorState::Open,
            },
        ],
    );
    assert_eq!(run.error_recovery_policy(), &policy);
    assert_eq!(run.status(), RunStatus::Running);
}

#[test]
fn hardware_stopped_without_result_is_stopped() {
    let mut run = fresh();
    run.apply(&hardware_stopped(), &CommandState::default());
    assert_eq!(run.status(), RunStatus::Stopped);
}

#[test]
fn set_error_recovery_policy_replaces_policy() {
    let policy = ErrorRecoveryPolicy::new(ErrorRecoveryType::FailRun);
    let mut run = fresh();
    run.apply(
        &Action::SetErrorRecoveryPolicy {
            policy: policy.clone(),
        },
        &CommandState::default(),
    );
    assert_eq!(run.error_recovery_policy(), &policy);
}

#[parameterized(
    succeeded = { true, false, RunStatus::Succeeded },
    failed = { true, true, RunStatus::Failed },
    stopped = { false, false, RunStatus::Stopped },
    stopped_with_error = { false, true, RunStatus::Stopped },
)]
fn finish_result(set_run_status: bool, with_error: bool, expected: RunStatus) {
    let error = with_error.then(|| {
        ErrorOccurrence::new("e", "GeneralError", ErrorCode::GeneralError, "boom", at(4))
    });
    let mut run = fresh();
    let commands = CommandState::default();
    apply_all(
        &mut run,
        &commands,
        &[
            play(),
            Action::Finish {
                error,
                set_run_status,
            },
            hardware_stopped(),
        ],
    );
    assert_eq!(run.status(), expected);
}

#[parameterized(
    ready = { RunStatus::Ready, "ready", false },
    blocked = { RunStatus::BlockedByOpenDoor, "blocked-by-open-door", false },
    recovery = { RunStatus::AwaitingRecoveryBlockedByOpenDoor, "awaiting-recovery-blocked-by-open-door", false },
    succeeded = { RunStatus::Succeeded, "succeeded", true },
    stopped = { RunStatus::Stopped, "stopped", true },
)]
fn status_display_matches_serde(status: RunStatus, expected: &str, terminal: bool) {
    assert_eq!(status.to_string(), expected);
    assert_eq!(
        serde_json::to_value(status).unwrap(),
        serde_json::Value::String(expected.to_string())
    );
    assert_eq!(status.is_terminal(), terminal);
}
