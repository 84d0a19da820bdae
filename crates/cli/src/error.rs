// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with hints on how to fix them

use std::fmt;
use std::path::Path;

/// An error worth explaining to whoever ran `pe`
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Details, one per line
    pub context: Vec<String>,
    /// What to try next
    pub suggestions: Vec<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for ctx in &self.context {
            write!(f, "\n  -> {}", ctx)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\n\nsuggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                write!(f, "\n  {}. {}", i + 1, suggestion)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Builders for the failures `pe` commonly reports
impl CliError {
    pub fn protocol_unreadable(path: &Path, source: std::io::Error) -> Self {
        CliError::new(format!("cannot read protocol {}", path.display()))
            .with_source(source)
            .with_suggestion("check the path and that the file is readable")
    }

    pub fn protocol_invalid(path: &Path, source: serde_json::Error) -> Self {
        CliError::new(format!("invalid protocol {}", path.display()))
            .with_context(format!("line {}, column {}", source.line(), source.column()))
            .with_source(source)
            .with_suggestion(
                r#"a protocol is JSON of the form {"commands": [{"commandType": "...", "params": {...}}]}"#,
            )
    }

    pub fn config_invalid(path: &Path, source: pe_engine::ConfigError) -> Self {
        CliError::new(format!("invalid config {}", path.display()))
            .with_source(source)
            .with_suggestion("run without --config to use the defaults")
    }

    pub fn command_rejected(index: usize, source: pe_engine::EngineError) -> Self {
        CliError::new(format!("command {} of the protocol was rejected", index + 1))
            .with_source(source)
    }

    pub fn log_unavailable(path: &Path, source: pe_storage::LogError) -> Self {
        CliError::new(format!("cannot open action log {}", path.display()))
            .with_source(source)
            .with_suggestion("check that the directory is writable")
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
