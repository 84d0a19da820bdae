// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use pe_core::{CommandStatus, RunStatus, State};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print output in the specified format
pub fn print<T: Serialize + fmt::Display>(value: &T, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", value),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(value) {
                println!("{}", json);
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandLine {
    pub id: String,
    pub key: String,
    pub command_type: &'static str,
    pub status: CommandStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Where a run ended up
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub commands: Vec<CommandLine>,
}

impl RunSummary {
    pub fn new(state: &State) -> Self {
        let commands = state
            .commands
            .all()
            .map(|c| CommandLine {
                id: c.id.to_string(),
                key: c.key.clone(),
                command_type: c.command_type(),
                status: c.status,
                error: c.error.as_ref().map(|e| format!("{}: {}", e.error_type, e.detail)),
            })
            .collect();
        Self {
            status: state.status(),
            error: state
                .run_error()
                .map(|e| format!("{}: {}", e.error_type, e.detail)),
            commands,
        }
    }

    pub fn count(&self, status: CommandStatus) -> usize {
        self.commands.iter().filter(|c| c.status == status).count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.commands {
            // Display impls ignore width, so pad the rendered string
            writeln!(f, "{:<10} {:<24} {}", c.status.to_string(), c.command_type, c.key)?;
            if let Some(error) = &c.error {
                writeln!(f, "{:<10} {}", "", error)?;
            }
        }
        writeln!(
            f,
            "run {}: {} succeeded, {} failed, {} not run",
            self.status,
            self.count(CommandStatus::Succeeded),
            self.count(CommandStatus::Failed),
            self.count(CommandStatus::Queued) + self.count(CommandStatus::Running),
        )?;
        if let Some(error) = &self.error {
            writeln!(f, "error: {}", error)?;
        }
        Ok(())
    }
}

/// What a replay rebuilt
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaySummary {
    /// Last log sequence number applied
    pub sequence: u64,
    pub replayed: usize,
    pub rejected: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corruption: Option<String>,
    pub run: RunSummary,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "replayed {} actions (through sequence {})",
            self.replayed, self.sequence
        )?;
        for rejected in &self.rejected {
            writeln!(f, "rejected: {}", rejected)?;
        }
        if let Some(corruption) = &self.corruption {
            writeln!(f, "log truncated: {}", corruption)?;
        }
        write!(f, "{}", self.run)
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
