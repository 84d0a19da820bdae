// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command worker
//!
//! A single task that runs whatever the state says should run next. It wakes
//! on every new snapshot, claims the next command by dispatching
//! `RunCommand`, runs the implementation, and reports the outcome. Once a run
//! result is latched and nothing is running it cleans up the hardware and
//! completes the run.

use crate::commands::{self, SuccessData};
use crate::config::EngineConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{CommandError, EngineFault};
use pe_adapters::{Hardware, Movement, Pipetting};
use pe_core::command::PipetteLocationUpdate;
use pe_core::{
    Action, Clock, Command, CommandParams, CommandStatus, ErrorCode, ErrorOccurrence, IdGen,
    State, StateUpdate,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::Instrument;

/// The parts of [`EngineConfig`] the worker acts on
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    pub command_timeout: Duration,
    pub finish_when_drained: bool,
    pub drop_tips_after_run: bool,
    pub home_after_run: bool,
}

impl From<&EngineConfig> for WorkerSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            command_timeout: config.command_timeout,
            finish_when_drained: config.finish_when_drained,
            drop_tips_after_run: config.drop_tips_after_run,
            home_after_run: config.home_after_run,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Nothing to do until the state changes
    Idle,
    /// Something happened; look again right away
    Progressed,
    /// The run is complete
    Done,
}

pub(crate) struct Worker<H: Hardware, C: Clock, I: IdGen> {
    dispatcher: Arc<Dispatcher<C, I>>,
    hardware: H,
    settings: WorkerSettings,
    finished: watch::Sender<bool>,
}

impl<H: Hardware, C: Clock, I: IdGen> Worker<H, C, I> {
    pub fn new(
        dispatcher: Arc<Dispatcher<C, I>>,
        hardware: H,
        settings: WorkerSettings,
        finished: watch::Sender<bool>,
    ) -> Self {
        Self {
            dispatcher,
            hardware,
            settings,
            finished,
        }
    }

    pub async fn run(self) {
        let mut updates = self.dispatcher.store().subscribe();
        loop {
            updates.borrow_and_update();
            let step = match self.step().await {
                Ok(step) => step,
                Err(fault) => {
                    // Already applied to the store; the next step cleans up
                    tracing::error!(error = %fault, "worker step faulted");
                    Step::Progressed
                }
            };
            match step {
                Step::Done => break,
                Step::Progressed => continue,
                Step::Idle => {}
            }
            if updates.changed().await.is_err() {
                break;
            }
        }
        tracing::info!(status = %self.dispatcher.state().status(), "worker finished");
        self.finished.send_replace(true);
    }

    async fn step(&self) -> Result<Step, EngineFault> {
        if self.dispatcher.state().run.is_completed() {
            return Ok(Step::Done);
        }

        if let Some(command) = self.claim()? {
            self.execute(command).await?;
            return Ok(Step::Progressed);
        }

        let state = self.dispatcher.state();
        if state.run.is_stopping() && state.commands.running_id().is_none() {
            self.complete(&state).await;
            return Ok(Step::Done);
        }

        if self.settings.finish_when_drained && state.is_drained() {
            let finished = self.dispatcher.dispatch_with(|state| {
                Ok::<_, EngineFault>(state.is_drained().then_some(Action::Finish {
                    error: None,
                    set_run_status: true,
                }))
            })?;
            if finished.is_some() {
                tracing::info!("queue drained, finishing run");
                return Ok(Step::Progressed);
            }
        }
        Ok(Step::Idle)
    }

    /// Mark the next runnable command as running, atomically with choosing it
    fn claim(&self) -> Result<Option<Command>, EngineFault> {
        let started_at = self.dispatcher.clock().now();
        let mut claimed = None;
        self.dispatcher.dispatch_with(|state| {
            let Some(id) = state.next_to_execute() else {
                return Ok::<_, EngineFault>(None);
            };
            claimed = state.commands.get(id).cloned();
            Ok(Some(Action::RunCommand {
                command_id: id.clone(),
                started_at,
            }))
        })?;
        Ok(claimed)
    }

    async fn execute(&self, command: Command) -> Result<(), EngineFault> {
        let span = tracing::info_span!(
            "command",
            id = %command.id,
            command_type = command.command_type()
        );
        async {
            let state = self.dispatcher.state();
            let start = Instant::now();
            let outcome = match tokio::time::timeout(
                self.settings.command_timeout,
                commands::execute(&command.params, &state, &self.hardware, self.dispatcher.ids()),
            )
            .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(CommandError::TimedOut(self.settings.command_timeout)),
            };
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &outcome {
                Ok(_) => tracing::info!(elapsed_ms, "succeeded"),
                Err(e) => tracing::warn!(elapsed_ms, error = %e, "failed"),
            }
            self.report(&command, outcome)
        }
        .instrument(span)
        .await
    }

    /// Dispatch the outcome, unless the command stopped running meanwhile
    fn report(
        &self,
        command: &Command,
        outcome: Result<SuccessData, CommandError>,
    ) -> Result<(), EngineFault> {
        let now = self.dispatcher.clock().now();
        let ids = self.dispatcher.ids();
        self.dispatcher.dispatch_with(|state| {
            let running = state
                .commands
                .get(&command.id)
                .is_some_and(|c| c.status == CommandStatus::Running);
            if !running {
                tracing::warn!("command no longer running, outcome dropped");
                return Ok::<_, EngineFault>(None);
            }
            let action = match outcome {
                Ok(success) => Action::SucceedCommand {
                    command_id: command.id.clone(),
                    completed_at: now,
                    result: success.result,
                    state_update: success.state_update,
                },
                Err(error) => {
                    let occurrence = ErrorOccurrence::new(
                        ids.next(),
                        error.error_type(),
                        error.error_code(),
                        error.to_string(),
                        now,
                    )
                    .for_command(command.id.clone());
                    let recovery = state
                        .run
                        .error_recovery_policy()
                        .recovery_for(command.intent, &occurrence);
                    Action::FailCommand {
                        command_id: command.id.clone(),
                        failed_at: now,
                        error: occurrence,
                        recovery,
                        state_update: failure_update(&command.params),
                    }
                }
            };
            Ok(Some(action))
        })?;
        Ok(())
    }

    /// Post-run cleanup, then mark the run complete
    async fn complete(&self, state: &State) {
        let finish_error = if state.run.stopped_by_estop() {
            tracing::warn!("emergency stop engaged, skipping post-run cleanup");
            None
        } else {
            self.clean_up(state)
                .instrument(tracing::info_span!("cleanup"))
                .await
        };
        let action = Action::HardwareStopped {
            completed_at: self.dispatcher.clock().now(),
            finish_error,
        };
        if let Err(fault) = self.dispatcher.dispatch(action) {
            tracing::error!(error = %fault, "failed to complete run");
        }
    }

    async fn clean_up(&self, state: &State) -> Option<ErrorOccurrence> {
        let mut failures = Vec::new();
        if self.settings.drop_tips_after_run {
            let pipetting = self.hardware.pipetting();
            for pipette in state.pipettes.all() {
                if !state.pipettes.has_tip(&pipette.id) {
                    continue;
                }
                tracing::info!(pipette = %pipette.id, "dropping tip in place");
                if let Err(e) = pipetting.drop_tip(pipette.mount, false).await {
                    failures.push(e);
                }
            }
        }
        if self.settings.home_after_run {
            if let Err(e) = self.hardware.movement().home(None).await {
                failures.push(e);
            }
        }
        if failures.is_empty() {
            return None;
        }

        let now = self.dispatcher.clock().now();
        let ids = self.dispatcher.ids();
        tracing::error!(failures = failures.len(), "post-run cleanup failed");
        let summary = ErrorOccurrence::new(
            ids.next(),
            "PostRunCleanupError",
            ErrorCode::RoboticsControlError,
            "post-run hardware cleanup failed",
            now,
        );
        Some(failures.iter().fold(summary, |summary, e| {
            summary.wrapping(ErrorOccurrence::new(
                ids.next(),
                e.error_type(),
                e.error_code(),
                e.to_string(),
                now,
            ))
        }))
    }
}

/// Whatever a failed command may have left uncertain
fn failure_update(params: &CommandParams) -> StateUpdate {
    let pipette_location = match params {
        CommandParams::Home(_) => Some(PipetteLocationUpdate::ClearAll),
        _ => params
            .moved_pipette()
            .map(|pipette_id| PipetteLocationUpdate::Unknown {
                pipette_id: pipette_id.to_string(),
            }),
    };
    StateUpdate {
        pipette_location,
        ..StateUpdate::default()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
