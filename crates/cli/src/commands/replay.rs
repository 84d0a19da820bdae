// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pe replay <log>` - Rebuild a run's state from its action log

use crate::output::{self, OutputFormat, ReplaySummary, RunSummary};
use anyhow::{Context, Result};
use clap::Args;
use pe_core::{Clock, SystemClock};
use pe_engine::EngineConfig;
use pe_storage::{Restored, Snapshot};
use std::path::PathBuf;

#[derive(Args)]
pub struct ReplayArgs {
    /// Action log written by `pe run --action-log`
    pub log: PathBuf,

    /// Start from this snapshot and replay only the entries after it
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Write the rebuilt state to this snapshot file
    #[arg(long)]
    pub save_snapshot: Option<PathBuf>,
}

pub fn handle(args: ReplayArgs, config: &EngineConfig, format: OutputFormat) -> Result<()> {
    if !args.log.is_file() {
        anyhow::bail!("action log not found: {}", args.log.display());
    }
    let snapshot = args
        .snapshot
        .as_deref()
        .map(|path| {
            Snapshot::load(path).with_context(|| format!("loading snapshot {}", path.display()))
        })
        .transpose()?;

    let restored = pe_storage::restore(&config.state_config(), snapshot, &args.log)?;

    if let Some(path) = &args.save_snapshot {
        Snapshot::new(restored.state.clone(), restored.sequence, SystemClock.now())
            .save(path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), sequence = restored.sequence, "snapshot saved");
    }

    output::print(&summarize(&restored), format);
    Ok(())
}

fn summarize(restored: &Restored) -> ReplaySummary {
    ReplaySummary {
        sequence: restored.sequence,
        replayed: restored.replayed,
        rejected: restored
            .rejected
            .iter()
            .map(|(sequence, e)| format!("#{sequence}: {e}"))
            .collect(),
        corruption: restored
            .corruption
            .as_ref()
            .map(|c| format!("line {}: {}", c.line, c.reason)),
        run: RunSummary::new(&restored.state),
    }
}
