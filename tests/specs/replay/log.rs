//! Rebuilding a run from its action log

use crate::prelude::*;

#[test]
fn replay_rebuilds_a_recorded_run() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);
    temp.pe()
        .args(&["run", "protocol.json", "--action-log", "actions.jsonl"])
        .passes();
    assert!(temp.exists("actions.jsonl"));

    temp.pe()
        .args(&["replay", "actions.jsonl"])
        .passes()
        .stdout_has("replayed ")
        .stdout_has("succeeded  dropTip                  drop-tip")
        .stdout_has("run succeeded: 7 succeeded, 0 failed, 0 not run")
        .stdout_lacks("rejected:")
        .stdout_lacks("log truncated");
}

#[test]
fn replay_keeps_the_failure_of_a_failed_run() {
    let temp = Project::empty();
    temp.file("protocol.json", NO_TIP);
    temp.pe()
        .args(&[
            "run",
            "protocol.json",
            "--on-error",
            "fail",
            "--action-log",
            "actions.jsonl",
        ])
        .fails();

    let run = temp
        .pe()
        .args(&["-o", "json", "replay", "actions.jsonl"])
        .passes();
    let summary = run.json();

    assert_eq!(summary["run"]["status"], "failed");
    assert_eq!(summary["run"]["commands"][2]["status"], "failed");
    assert_eq!(summary["rejected"].as_array().map(Vec::len), Some(0));
}

#[test]
fn snapshot_skips_the_entries_it_covers() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);
    temp.pe()
        .args(&["run", "protocol.json", "--action-log", "actions.jsonl"])
        .passes();

    let full = temp
        .pe()
        .args(&[
            "-o",
            "json",
            "replay",
            "actions.jsonl",
            "--save-snapshot",
            "snapshot.json",
        ])
        .passes()
        .json();
    assert!(temp.exists("snapshot.json"));

    let resumed = temp
        .pe()
        .args(&[
            "-o",
            "json",
            "replay",
            "actions.jsonl",
            "--snapshot",
            "snapshot.json",
        ])
        .passes()
        .json();

    assert_eq!(resumed["replayed"], 0);
    assert_eq!(resumed["sequence"], full["sequence"]);
    assert_eq!(resumed["run"], full["run"]);
}

#[test]
fn truncated_log_replays_what_survives() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);
    temp.pe()
        .args(&["run", "protocol.json", "--action-log", "actions.jsonl"])
        .passes();

    let log = temp.read("actions.jsonl");
    let torn = format!("{}{{\"seq", log);
    temp.file("actions.jsonl", &torn);

    temp.pe()
        .args(&["replay", "actions.jsonl"])
        .passes()
        .stdout_has("log truncated: line ")
        .stdout_has("run succeeded");
}
