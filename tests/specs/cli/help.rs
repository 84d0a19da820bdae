//! Help and version output

use crate::prelude::*;

#[test]
fn help_lists_the_subcommands() {
    let temp = Project::empty();
    temp.pe()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("replay")
        .stdout_has("--output");
}

#[test]
fn run_help_describes_recovery_choices() {
    let temp = Project::empty();
    temp.pe()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--on-error")
        .stdout_has("--action-log");
}

#[test]
fn version_prints_the_crate_version() {
    let temp = Project::empty();
    temp.pe()
        .args(&["--version"])
        .passes()
        .stdout_has(env!("CARGO_PKG_VERSION"));
}
