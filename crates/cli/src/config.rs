// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Where `pe` finds its engine configuration

use crate::error::CliError;
use pe_engine::EngineConfig;
use std::path::{Path, PathBuf};

/// `<config dir>/pe/config.toml`, e.g. `~/.config/pe/config.toml` on Linux
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pe").join("config.toml"))
}

/// Load an explicit config file, else the default file if it exists, else
/// the built-in defaults
pub fn load(explicit: Option<&Path>) -> Result<EngineConfig, CliError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.is_file() => path,
            _ => {
                tracing::debug!("no config file, using defaults");
                return Ok(EngineConfig::default());
            }
        },
    };
    let config = EngineConfig::load(&path).map_err(|e| CliError::config_invalid(&path, e))?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
