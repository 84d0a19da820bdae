// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pe run <protocol.json>` - Run a protocol against the simulated robot

use crate::error::CliError;
use crate::output::{self, OutputFormat, RunSummary};
use crate::protocol::Protocol;
use anyhow::Result;
use clap::{Args, ValueEnum};
use pe_adapters::{SimulatedHardware, TracedHardware};
use pe_core::{Clock, ErrorRecoveryType, IdGen, RunStatus, State, SystemClock, UuidIdGen};
use pe_engine::{ActionHandler, ActionRecorder, EngineConfig, EngineDeps, ProtocolEngine};
use pe_storage::ActionLog;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Args)]
pub struct RunArgs {
    /// Protocol file: {"commands": [...]}
    pub protocol: PathBuf,

    /// Record every action to this log, for `pe replay`
    #[arg(long)]
    pub action_log: Option<PathBuf>,

    /// What a failed command does to the rest of the run
    #[arg(long, value_enum)]
    pub on_error: Option<OnError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    /// Fail the run and skip every remaining command
    Fail,
    /// Record the failure and carry on
    Continue,
}

impl From<OnError> for ErrorRecoveryType {
    fn from(on_error: OnError) -> Self {
        match on_error {
            OnError::Fail => ErrorRecoveryType::FailRun,
            OnError::Continue => ErrorRecoveryType::IgnoreAndContinue,
        }
    }
}

pub async fn handle(args: RunArgs, mut config: EngineConfig, format: OutputFormat) -> Result<()> {
    let protocol = Protocol::load(&args.protocol)?;
    if let Some(on_error) = args.on_error {
        config.error_recovery_policy.default = on_error.into();
    }

    let mut handlers: Vec<Box<dyn ActionHandler>> = Vec::new();
    if let Some(path) = &args.action_log {
        let log = ActionLog::open(path).map_err(|e| CliError::log_unavailable(path, e))?;
        handlers.push(Box::new(ActionRecorder::new(log)));
    }

    let engine = ProtocolEngine::start(
        &config,
        EngineDeps {
            hardware: TracedHardware::new(SimulatedHardware::new(config.simulator.clone())),
            clock: SystemClock,
            ids: UuidIdGen,
            handlers,
        },
    );
    tracing::info!(
        protocol = %args.protocol.display(),
        commands = protocol.commands.len(),
        "running protocol"
    );
    for (index, request) in protocol.commands.into_iter().enumerate() {
        engine
            .add_command(request)
            .map_err(|e| CliError::command_rejected(index, e))?;
    }
    engine.play()?;

    let interrupt = Arc::new(Notify::new());
    let notify = Arc::clone(&interrupt);
    ctrlc::set_handler(move || notify.notify_one())?;

    let state = supervise(&engine, &interrupt).await;
    let summary = RunSummary::new(&state);
    output::print(&summary, format);

    match state.status() {
        RunStatus::Succeeded => Ok(()),
        status => anyhow::bail!("run {}", status),
    }
}

/// Follow the run to completion, stopping it on Ctrl-C.
///
/// Nobody is around to resolve a failure interactively, so a run that ends
/// up awaiting recovery is finished with the failed command's error.
async fn supervise<C: Clock, I: IdGen>(engine: &ProtocolEngine<C, I>, interrupt: &Notify) -> Arc<State> {
    let mut updates = engine.subscribe();
    loop {
        let state = Arc::clone(&updates.borrow_and_update());
        if state.run.is_completed() {
            return engine.wait_until_complete().await;
        }
        if state.status() == RunStatus::AwaitingRecovery {
            give_up(engine, &state);
        }
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    return engine.wait_until_complete().await;
                }
            }
            _ = interrupt.notified() => {
                eprintln!("stopping run...");
                if let Err(e) = engine.stop() {
                    tracing::warn!(error = %e, "stop refused");
                }
            }
        }
    }
}

fn give_up<C: Clock, I: IdGen>(engine: &ProtocolEngine<C, I>, state: &State) {
    let error = state
        .commands
        .most_recently_failed()
        .and_then(|command| command.error.clone());
    tracing::warn!(
        error = error.as_ref().map(|e| e.detail.as_str()),
        "command failed and no operator can recover, failing the run"
    );
    if let Err(e) = engine.finish(error) {
        tracing::warn!(error = %e, "finish refused");
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
