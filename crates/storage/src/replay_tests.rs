// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pe_core::command::CommentParams;
use pe_core::{
    CommandId, CommandParams, CommandRequest, CommandResult, CommandStatus, ErrorCode,
    ErrorOccurrence, RunStatus, StateUpdate,
};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seconds)
}

fn comment(id: &str, t: i64) -> Action {
    Action::QueueCommand {
        command_id: CommandId::from(id),
        created_at: at(t),
        request: CommandRequest::new(CommandParams::Comment(CommentParams {
            message: format!("step {id}"),
        })),
    }
}

fn run_and_succeed(id: &str, t: i64) -> [Action; 2] {
    [
        Action::RunCommand {
            command_id: CommandId::from(id),
            started_at: at(t),
        },
        Action::SucceedCommand {
            command_id: CommandId::from(id),
            completed_at: at(t + 1),
            result: CommandResult::Empty,
            state_update: StateUpdate::default(),
        },
    ]
}

fn two_comment_run() -> Vec<Action> {
    let mut actions = vec![
        comment("c1", 0),
        comment("c2", 0),
        Action::Play {
            requested_at: at(1),
        },
    ];
    actions.extend(run_and_succeed("c1", 2));
    actions.extend(run_and_succeed("c2", 4));
    actions
}

fn write_log(path: &Path, actions: &[Action]) {
    let mut log = ActionLog::open(path).unwrap();
    for action in actions {
        log.append(action).unwrap();
    }
}

fn reduce_all(actions: &[Action]) -> State {
    actions
        .iter()
        .fold(State::new(&StateConfig::default()), |state, action| {
            state.reduce(action).unwrap()
        })
}

#[test]
fn restore_from_log_matches_live_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let actions = two_comment_run();
    write_log(&path, &actions);

    let restored = restore(&StateConfig::default(), None, &path).unwrap();
    assert_eq!(restored.state, reduce_all(&actions));
    assert_eq!(restored.sequence, 7);
    assert_eq!(restored.replayed, 7);
    assert!(restored.rejected.is_empty());
    assert!(restored.corruption.is_none());
}

#[test]
fn restore_from_snapshot_replays_only_the_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let actions = two_comment_run();
    write_log(&path, &actions);

    let snapshot = Snapshot::new(reduce_all(&actions[..3]), 3, at(1));
    let restored = restore(&StateConfig::default(), Some(snapshot), &path).unwrap();

    assert_eq!(restored.replayed, 4);
    assert_eq!(restored.state, reduce_all(&actions));
}

#[test]
fn snapshot_ahead_of_log_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    write_log(&path, &two_comment_run()[..2]);

    let snapshot = Snapshot::new(State::new(&StateConfig::default()), 5, at(0));
    let err = restore(&StateConfig::default(), Some(snapshot), &path).unwrap_err();
    assert!(matches!(
        err,
        ReplayError::SnapshotAhead {
            snapshot: 5,
            log: 2
        }
    ));
}

#[test]
fn rejected_actions_are_reported_and_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.log");
    let fault = ErrorOccurrence::new(
        "fault-1",
        "EngineFault",
        ErrorCode::EngineFault,
        "command not found: ghost",
        at(3),
    );
    let actions = vec![
        comment("c1", 0),
        Action::Play {
            requested_at: at(1),
        },
        Action::RunCommand {
            command_id: CommandId::from("ghost"),
            started_at: at(2),
        },
        Action::EngineFault {
            error: fault,
            completed_at: None,
        },
    ];
    write_log(&path, &actions);

    let restored = restore(&StateConfig::default(), None, &path).unwrap();
    assert_eq!(restored.rejected.len(), 1);
    assert_eq!(restored.rejected[0].0, 3);
    assert_eq!(
        restored.rejected[0].1,
        ReduceError::CommandNotFound(CommandId::from("ghost"))
    );
    assert_eq!(restored.state.status(), RunStatus::StopRequested);
    assert_eq!(
        restored
            .state
            .commands
            .get(&CommandId::from("c1"))
            .map(|c| c.status),
        Some(CommandStatus::Queued)
    );
}

#[test]
fn replay_is_deterministic() {
    let actions = two_comment_run();
    let (first, _) = replay(State::new(&StateConfig::default()), &actions);
    let (second, _) = replay(State::new(&StateConfig::default()), &actions);
    assert_eq!(first, second);
    assert_eq!(first.status(), RunStatus::Running);
}

#[test]
fn missing_log_restores_fresh_state() {
    let dir = tempfile::tempdir().unwrap();
    let restored = restore(&StateConfig::default(), None, &dir.path().join("none.log")).unwrap();
    assert_eq!(restored.state, State::new(&StateConfig::default()));
    assert_eq!(restored.sequence, 0);
}
