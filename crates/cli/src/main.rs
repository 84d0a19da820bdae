// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pe - run liquid-handling protocols against a simulated robot

mod commands;
mod config;
mod error;
mod logging;
mod output;
mod protocol;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{replay, run};
use output::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pe",
    version,
    about = "Protocol engine - run liquid-handling protocols on a simulated robot"
)]
struct Cli {
    /// Engine config (TOML); defaults to <config dir>/pe/config.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a protocol file to completion
    Run(run::RunArgs),
    /// Rebuild a run's state from its action log
    Replay(replay::ReplayArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_file.as_deref())?;
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => run::handle(args, config, cli.output).await,
        Commands::Replay(args) => replay::handle(args, &config, cli.output),
    }
}
