// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Point-in-time state captures
//!
//! A snapshot records the state after a given log sequence number, so a
//! restore only has to replay the entries that follow it.

use chrono::{DateTime, Utc};
use pe_core::State;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version: {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    /// Last log sequence number reflected in `state`
    pub sequence: u64,
    pub taken_at: DateTime<Utc>,
    pub state: State,
}

impl Snapshot {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn new(state: State, sequence: u64, taken_at: DateTime<Utc>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            sequence,
            taken_at,
            state,
        }
    }

    /// Write atomically: a reader sees either the old snapshot or the new one
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), sequence = self.sequence, "snapshot saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        if snapshot.version != Self::CURRENT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                expected: Self::CURRENT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
