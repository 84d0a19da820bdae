//! Running protocols to completion

use crate::prelude::*;

#[test]
fn transfer_protocol_succeeds() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);

    temp.pe().args(&["run", "protocol.json"]).passes().stdout_eq(
        "\
succeeded  loadPipette              pipette
succeeded  loadLabware              tips
succeeded  loadLabware              plate
succeeded  pickUpTip                pick-up
succeeded  aspirate                 aspirate
succeeded  dispense                 dispense
succeeded  dropTip                  drop-tip
run succeeded: 7 succeeded, 0 failed, 0 not run
",
    );
}

#[test]
fn json_output_carries_wire_names() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);

    let run = temp
        .pe()
        .args(&["-o", "json", "run", "protocol.json"])
        .passes();
    let summary = run.json();

    assert_eq!(summary["status"], "succeeded");
    let commands = summary["commands"].as_array().unwrap();
    assert_eq!(commands.len(), 7);
    assert_eq!(commands[4]["commandType"], "aspirate");
    assert_eq!(commands[4]["key"], "aspirate");
    assert_eq!(commands[4]["status"], "succeeded");
    assert!(summary.get("error").is_none());
}

#[test]
fn commands_without_keys_are_keyed_by_id() {
    let temp = Project::empty();
    temp.file(
        "protocol.json",
        r#"{"commands": [{"commandType": "comment", "params": {"message": "hi"}}]}"#,
    );

    let run = temp
        .pe()
        .args(&["-o", "json", "run", "protocol.json"])
        .passes();
    let summary = run.json();

    let command = &summary["commands"][0];
    assert_eq!(command["key"], command["id"]);
}

#[test]
fn empty_protocol_succeeds() {
    let temp = Project::empty();
    temp.file("protocol.json", r#"{"commands": []}"#);

    temp.pe()
        .args(&["run", "protocol.json"])
        .passes()
        .stdout_eq("run succeeded: 0 succeeded, 0 failed, 0 not run\n");
}

#[test]
fn log_file_receives_engine_logs() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);

    temp.pe()
        .args(&["--log-file", "pe.log", "run", "protocol.json"])
        .passes();

    assert!(temp.read("pe.log").contains("running protocol"));
}
