// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The protocol engine: one run, its worker, and its event forwarder

use crate::config::EngineConfig;
use crate::controller::{ResumeAction, RunController};
use crate::dispatcher::{ActionHandler, Dispatcher};
use crate::error::EngineError;
use crate::forwarder::Forwarder;
use crate::handlers::TracingHandler;
use crate::worker::{Worker, WorkerSettings};
use pe_adapters::Hardware;
use pe_core::{
    Action, Clock, Command, CommandId, CommandRequest, ErrorOccurrence, ErrorRecoveryPolicy, IdGen, State,
    StateConfig,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Everything an engine is built from
pub struct EngineDeps<H, C, I> {
    pub hardware: H,
    pub clock: C,
    pub ids: I,
    /// Run before the built-in tracing handler, in order
    pub handlers: Vec<Box<dyn ActionHandler>>,
}

pub struct ProtocolEngine<C: Clock, I: IdGen> {
    dispatcher: Arc<Dispatcher<C, I>>,
    controller: RunController<C, I>,
    finished: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl<C: Clock, I: IdGen> ProtocolEngine<C, I> {
    /// Create a fresh run and spawn its worker and forwarder.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// The run's settings are dispatched first, so an action log of the run
    /// is enough to rebuild it.
    pub fn start<H: Hardware>(config: &EngineConfig, deps: EngineDeps<H, C, I>) -> Self {
        let settings = config.state_config();
        Self::launch(State::new(&settings), Some(settings), config, deps)
    }

    /// As [`ProtocolEngine::start`], continuing from an existing state
    pub fn start_from<H: Hardware>(
        initial: State,
        config: &EngineConfig,
        deps: EngineDeps<H, C, I>,
    ) -> Self {
        Self::launch(initial, None, config, deps)
    }

    fn launch<H: Hardware>(
        initial: State,
        settings: Option<StateConfig>,
        config: &EngineConfig,
        deps: EngineDeps<H, C, I>,
    ) -> Self {
        let EngineDeps {
            hardware,
            clock,
            ids,
            mut handlers,
        } = deps;
        handlers.push(Box::new(TracingHandler));
        let dispatcher = Arc::new(Dispatcher::new(initial, handlers, clock, ids));
        if let Some(config) = settings {
            if let Err(fault) = dispatcher.dispatch(Action::Configure { config }) {
                tracing::error!(error = %fault, "failed to record run settings");
            }
        }

        let (finished_tx, finished) = watch::channel(false);
        let worker = Worker::new(
            Arc::clone(&dispatcher),
            hardware.clone(),
            WorkerSettings::from(config),
            finished_tx,
        );
        let forwarder = Forwarder::new(Arc::clone(&dispatcher), hardware.events());
        let tasks = vec![tokio::spawn(worker.run()), tokio::spawn(forwarder.run())];
        tracing::info!(status = %dispatcher.state().status(), "engine started");

        Self {
            controller: RunController::new(Arc::clone(&dispatcher)),
            dispatcher,
            finished,
            tasks,
        }
    }

    pub fn state(&self) -> Arc<State> {
        self.dispatcher.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
        self.dispatcher.store().subscribe()
    }

    /// A snapshot of one command as it stands now
    pub fn command(&self, id: &CommandId) -> Result<Command, EngineError> {
        Ok(self.state().command(id)?.clone())
    }

    /// A handle for issuing control requests from other tasks
    pub fn controller(&self) -> RunController<C, I> {
        self.controller.clone()
    }

    pub fn add_command(&self, request: CommandRequest) -> Result<CommandId, EngineError> {
        self.controller.add_command(request)
    }

    pub fn add_command_with_id(
        &self,
        id: CommandId,
        request: CommandRequest,
    ) -> Result<CommandId, EngineError> {
        self.controller.add_command_with_id(id, request)
    }

    pub fn play(&self) -> Result<(), EngineError> {
        self.controller.play()
    }

    pub fn pause(&self) -> Result<(), EngineError> {
        self.controller.pause()
    }

    pub fn stop(&self) -> Result<(), EngineError> {
        self.controller.stop()
    }

    pub fn resume_from_recovery(&self, how: ResumeAction) -> Result<(), EngineError> {
        self.controller.resume_from_recovery(how)
    }

    pub fn finish(&self, error: Option<ErrorOccurrence>) -> Result<(), EngineError> {
        self.controller.finish(error)
    }

    pub fn set_error_recovery_policy(&self, policy: ErrorRecoveryPolicy) -> Result<(), EngineError> {
        self.controller.set_error_recovery_policy(policy)
    }

    /// The first snapshot, current or future, that satisfies `pred`
    pub async fn wait_for<F>(&self, mut pred: F) -> Arc<State>
    where
        F: FnMut(&State) -> bool,
    {
        let mut updates = self.subscribe();
        let found = match updates.wait_for(|state| pred(state)).await {
            Ok(state) => Arc::clone(&state),
            Err(_) => self.state(),
        };
        found
    }

    /// Wait for the worker to complete the run, then return the final state
    pub async fn wait_until_complete(&self) -> Arc<State> {
        let mut finished = self.finished.clone();
        if finished.wait_for(|done| *done).await.is_err() {
            tracing::error!("worker exited without completing the run");
        }
        self.state()
    }

    /// Stop the background tasks. The run itself is left as it is.
    pub fn shutdown(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl<C: Clock, I: IdGen> Drop for ProtocolEngine<C, I> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
