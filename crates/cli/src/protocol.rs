// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol files: `{"commands": [ <submission>, ... ]}`

use crate::error::CliError;
use pe_core::CommandRequest;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Protocol {
    pub commands: Vec<CommandRequest>,
}

impl Protocol {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::protocol_unreadable(path, e))?;
        Self::parse(&text).map_err(|e| CliError::protocol_invalid(path, e))
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
