//! Errors reported before a run starts

use crate::prelude::*;

#[test]
fn missing_protocol_is_reported() {
    let temp = Project::empty();
    temp.pe()
        .args(&["run", "nowhere.json"])
        .fails()
        .stderr_has("cannot read protocol nowhere.json");
}

#[test]
fn malformed_protocol_points_at_the_problem() {
    let temp = Project::empty();
    temp.file("broken.json", "{\"commands\": [\n  {\"commandType\": }\n]}");
    temp.pe()
        .args(&["run", "broken.json"])
        .fails()
        .stderr_has("invalid protocol broken.json")
        .stderr_has("line 2");
}

#[test]
fn unknown_command_type_is_rejected() {
    let temp = Project::empty();
    temp.file(
        "protocol.json",
        r#"{"commands": [{"commandType": "juggle", "params": {}}]}"#,
    );
    temp.pe()
        .args(&["run", "protocol.json"])
        .fails()
        .stderr_has("invalid protocol");
}

#[test]
fn invalid_config_is_reported() {
    let temp = Project::empty();
    temp.file("protocol.json", TRANSFER);
    temp.file("pe.toml", "command_timeout = [");
    temp.pe()
        .args(&["--config", "pe.toml", "run", "protocol.json"])
        .fails()
        .stderr_has("invalid config pe.toml");
}

#[test]
fn replay_without_a_log_fails() {
    let temp = Project::empty();
    temp.pe()
        .args(&["replay", "missing.jsonl"])
        .fails()
        .stderr_has("action log not found: missing.jsonl");
}
