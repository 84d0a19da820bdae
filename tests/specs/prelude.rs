//! Shared helpers for the CLI specs

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Load a pipette and two labware, then move 50 µL from A1 to B1
pub const TRANSFER: &str = r#"{
  "commands": [
    {"commandType": "loadPipette", "key": "pipette",
     "params": {"pipetteName": "p300_single_gen2", "mount": "left", "pipetteId": "pip"}},
    {"commandType": "loadLabware", "key": "tips",
     "params": {"loadName": "opentrons_96_tiprack_300ul", "labwareId": "tips",
                "location": {"kind": "slot", "slot": 1}}},
    {"commandType": "loadLabware", "key": "plate",
     "params": {"loadName": "corning_96_wellplate_360ul_flat", "labwareId": "plate",
                "location": {"kind": "slot", "slot": 2}}},
    {"commandType": "pickUpTip", "key": "pick-up",
     "params": {"pipetteId": "pip", "labwareId": "tips", "wellName": "A1"}},
    {"commandType": "aspirate", "key": "aspirate",
     "params": {"pipetteId": "pip", "labwareId": "plate", "wellName": "A1",
                "volume": 50, "flowRate": 50}},
    {"commandType": "dispense", "key": "dispense",
     "params": {"pipetteId": "pip", "labwareId": "plate", "wellName": "B1",
                "volume": 50, "flowRate": 50}},
    {"commandType": "dropTip", "key": "drop-tip",
     "params": {"pipetteId": "pip", "labwareId": "tips", "wellName": "A1"}}
  ]
}"#;

/// Aspirates before any tip is picked up, then leaves a comment
pub const NO_TIP: &str = r#"{
  "commands": [
    {"commandType": "loadPipette", "key": "pipette",
     "params": {"pipetteName": "p300_single_gen2", "mount": "left", "pipetteId": "pip"}},
    {"commandType": "loadLabware", "key": "plate",
     "params": {"loadName": "corning_96_wellplate_360ul_flat", "labwareId": "plate",
                "location": {"kind": "slot", "slot": 2}}},
    {"commandType": "aspirate", "key": "aspirate",
     "params": {"pipetteId": "pip", "labwareId": "plate", "wellName": "A1",
                "volume": 50, "flowRate": 50}},
    {"commandType": "comment", "key": "after", "params": {"message": "still here"}}
  ]
}"#;

/// A scratch directory to run `pe` in
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write `content` to `name`, creating parent directories
    pub fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).unwrap()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// `pe` running inside the project, isolated from the user's config
    pub fn pe(&self) -> CliBuilder {
        let mut cmd = Command::cargo_bin("pe").unwrap();
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join(".config"))
            .env("HOME", self.dir.path())
            .env_remove("RUST_LOG");
        CliBuilder { cmd }
    }
}

pub struct CliBuilder {
    cmd: Command,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            run.success,
            "expected success\nstdout:\n{}\nstderr:\n{}",
            run.stdout, run.stderr
        );
        run
    }

    pub fn fails(mut self) -> RunAssert {
        let output = self.cmd.output().unwrap();
        let run = RunAssert::from(output);
        assert!(
            !run.success,
            "expected failure\nstdout:\n{}\nstderr:\n{}",
            run.stdout, run.stderr
        );
        run
    }
}

pub struct RunAssert {
    success: bool,
    stdout: String,
    stderr: String,
}

impl From<std::process::Output> for RunAssert {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl RunAssert {
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(
            self.stdout.contains(needle),
            "stdout is missing {needle:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(
            !self.stdout.contains(needle),
            "stdout unexpectedly has {needle:?}\nstdout:\n{}",
            self.stdout
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout, expected);
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(
            self.stderr.contains(needle),
            "stderr is missing {needle:?}\nstderr:\n{}",
            self.stderr
        );
        self
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout).unwrap()
    }
}
