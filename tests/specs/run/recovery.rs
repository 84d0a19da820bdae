//! What a failed command does to an unattended run

use crate::prelude::*;

#[test]
fn on_error_continue_runs_the_rest() {
    let temp = Project::empty();
    temp.file("protocol.json", NO_TIP);

    temp.pe()
        .args(&["run", "protocol.json", "--on-error", "continue"])
        .passes()
        .stdout_has("failed     aspirate                 aspirate")
        .stdout_has("succeeded  comment                  after")
        .stdout_has("run succeeded: 3 succeeded, 1 failed, 0 not run")
        .stdout_lacks("error:");
}

#[test]
fn on_error_fail_fails_the_run() {
    let temp = Project::empty();
    temp.file("protocol.json", NO_TIP);

    temp.pe()
        .args(&["run", "protocol.json", "--on-error", "fail"])
        .fails()
        .stdout_has("failed     aspirate                 aspirate")
        .stdout_has("run failed")
        .stderr_has("run failed");
}

#[test]
fn unattended_recovery_fails_the_run_with_the_command_error() {
    let temp = Project::empty();
    temp.file("protocol.json", NO_TIP);

    temp.pe()
        .args(&["run", "protocol.json"])
        .fails()
        .stdout_has("run failed")
        .stdout_has("error: ")
        .stdout_lacks("succeeded  comment");
}

#[test]
fn config_file_sets_the_default_recovery() {
    let temp = Project::empty();
    temp.file("protocol.json", NO_TIP);
    temp.file(
        ".config/pe/config.toml",
        "[error_recovery_policy]\ndefault = \"ignore_and_continue\"\n",
    );

    temp.pe()
        .args(&["run", "protocol.json"])
        .passes()
        .stdout_has("run succeeded");
}
