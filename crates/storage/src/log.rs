// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only action log
//!
//! One checksummed JSON entry per line. Reading stops at the first entry
//! that fails to parse, fails its checksum, or breaks the sequence; a torn
//! final write therefore loses only that one action.

use crate::entry::LogEntry;
use pe_core::Action;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where and why reading stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogCorruption {
    /// 1-based line number of the bad entry
    pub line: u64,
    pub reason: String,
}

/// Every valid entry of a log, in order
#[derive(Debug, Default)]
pub struct LogContents {
    pub entries: Vec<LogEntry>,
    pub corruption: Option<LogCorruption>,
    /// Byte length of the valid prefix
    valid_len: u64,
}

impl LogContents {
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.entries.iter().map(|e| &e.action)
    }

    pub fn last_sequence(&self) -> u64 {
        self.entries.last().map(|e| e.sequence).unwrap_or(0)
    }
}

/// Writer half of the action log
pub struct ActionLog {
    file: File,
    path: PathBuf,
    sequence: u64,
}

impl ActionLog {
    /// Open or create a log. A corrupt tail is cut off so new entries
    /// follow the last valid one.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = Self::read(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;

        if let Some(corruption) = &contents.corruption {
            tracing::warn!(
                path = %path.display(),
                line = corruption.line,
                reason = %corruption.reason,
                "truncating corrupt action log tail"
            );
            file.set_len(contents.valid_len)?;
            file.sync_all()?;
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            sequence: contents.last_sequence(),
        })
    }

    /// Append an action and flush it to disk. Returns its sequence number.
    pub fn append(&mut self, action: &Action) -> Result<u64, LogError> {
        let entry = LogEntry::new(self.sequence + 1, action.clone());
        let line = entry.to_line()?;
        writeln!(self.file, "{}", line)?;
        self.file.sync_data()?;
        self.sequence = entry.sequence;
        Ok(self.sequence)
    }

    /// Sequence number of the last entry written, 0 when empty
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the valid prefix of a log. A missing file reads as empty.
    pub fn read(path: &Path) -> Result<LogContents, LogError> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(LogContents::default()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = BufReader::new(file);
        let mut contents = LogContents::default();
        let mut line_number = 0u64;
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line)?;
            if bytes_read == 0 {
                break;
            }
            line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                contents.valid_len += bytes_read as u64;
                continue;
            }
            let corruption = |reason: String| LogCorruption {
                line: line_number,
                reason,
            };
            if !line.ends_with('\n') {
                contents.corruption = Some(corruption("incomplete final line".to_string()));
                break;
            }
            let entry = match LogEntry::from_line(trimmed) {
                Ok(entry) => entry,
                Err(e) => {
                    contents.corruption = Some(corruption(e.to_string()));
                    break;
                }
            };
            if !entry.verify() {
                contents.corruption = Some(corruption("checksum mismatch".to_string()));
                break;
            }
            let expected = contents.last_sequence() + 1;
            if entry.sequence != expected {
                contents.corruption = Some(corruption(format!(
                    "expected sequence {}, found {}",
                    expected, entry.sequence
                )));
                break;
            }

            contents.valid_len += bytes_read as u64;
            contents.entries.push(entry);
        }

        Ok(contents)
    }
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
