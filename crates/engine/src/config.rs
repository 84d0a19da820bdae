// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration, loaded from TOML

use pe_adapters::SimulatorConfig;
use pe_core::{ErrorRecoveryPolicy, StateConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pause the run while the front door is open
    pub block_on_door_open: bool,
    /// Longest a single command may run before it fails
    #[serde(with = "humantime_serde")]
    pub command_timeout: Duration,
    /// Finish the run once every queued command has settled
    pub finish_when_drained: bool,
    pub drop_tips_after_run: bool,
    pub home_after_run: bool,
    pub error_recovery_policy: ErrorRecoveryPolicy,
    pub simulator: SimulatorConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_on_door_open: true,
            command_timeout: Duration::from_secs(5 * 60),
            finish_when_drained: true,
            drop_tips_after_run: true,
            home_after_run: true,
            error_recovery_policy: ErrorRecoveryPolicy::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Settings the state store needs at creation
    pub fn state_config(&self) -> StateConfig {
        StateConfig {
            block_on_door_open: self.block_on_door_open,
            error_recovery_policy: self.error_recovery_policy.clone(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
