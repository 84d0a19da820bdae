// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action log entry with checksum verification

use pe_core::Action;
use serde::{Deserialize, Serialize};

/// A single line of the action log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the log, starting at 1
    pub sequence: u64,
    pub action: Action,
    /// CRC32 of the serialized action
    pub checksum: u32,
}

impl LogEntry {
    pub fn new(sequence: u64, action: Action) -> Self {
        let checksum = Self::calculate_checksum(&action);
        Self {
            sequence,
            action,
            checksum,
        }
    }

    fn calculate_checksum(action: &Action) -> u32 {
        // Actions hold only strings, numbers, maps and timestamps, so this
        // never falls back to the empty string in practice
        let json = serde_json::to_string(action).unwrap_or_default();
        crc32fast::hash(json.as_bytes())
    }

    pub fn verify(&self) -> bool {
        self.checksum == Self::calculate_checksum(&self.action)
    }

    /// Serialize to one line of JSON, without the trailing newline
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
