// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run controller
//!
//! Control requests are validated against the same snapshot the resulting
//! action is applied to. An illegal request returns a [`ControlError`] and
//! changes nothing; a request that is already satisfied is a quiet success.

use crate::dispatcher::Dispatcher;
use crate::error::EngineError;
use pe_core::{
    Action, Clock, CommandId, CommandRequest, ErrorOccurrence, ErrorRecoveryPolicy, IdGen,
    PauseSource, RecoveryResolution,
};
use std::sync::Arc;

/// How to leave `AwaitingRecovery`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeAction {
    /// Leave the failed command failed and carry on with the queue
    Continue,
    /// Run a copy of the failed command before anything else
    Retry,
}

pub struct RunController<C: Clock, I: IdGen> {
    dispatcher: Arc<Dispatcher<C, I>>,
}

impl<C: Clock, I: IdGen> Clone for RunController<C, I> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<C: Clock, I: IdGen> RunController<C, I> {
    pub fn new(dispatcher: Arc<Dispatcher<C, I>>) -> Self {
        Self { dispatcher }
    }

    /// Queue a command under a freshly assigned id
    pub fn add_command(&self, request: CommandRequest) -> Result<CommandId, EngineError> {
        let id = self.dispatcher.ids().command_id();
        self.add_command_with_id(id, request)
    }

    pub fn add_command_with_id(
        &self,
        id: CommandId,
        request: CommandRequest,
    ) -> Result<CommandId, EngineError> {
        let created_at = self.dispatcher.clock().now();
        self.dispatcher.dispatch_with(|state| {
            state.validate_queue(&id, request.intent)?;
            Ok::<_, EngineError>(Some(Action::QueueCommand {
                command_id: id.clone(),
                created_at,
                request,
            }))
        })?;
        tracing::debug!(command_id = %id, "queued");
        Ok(id)
    }

    pub fn play(&self) -> Result<(), EngineError> {
        let requested_at = self.dispatcher.clock().now();
        self.dispatcher.dispatch_with(|state| {
            Ok::<_, EngineError>(state.validate_play()?.then_some(Action::Play { requested_at }))
        })?;
        Ok(())
    }

    pub fn pause(&self) -> Result<(), EngineError> {
        self.dispatcher.dispatch_with(|state| {
            Ok::<_, EngineError>(state.validate_pause()?.then_some(Action::Pause {
                source: PauseSource::Client,
            }))
        })?;
        Ok(())
    }

    /// Latch a stopped result. The running command, if any, is left to settle.
    pub fn stop(&self) -> Result<(), EngineError> {
        let requested_at = self.dispatcher.clock().now();
        self.dispatcher.dispatch_with(|state| {
            Ok::<_, EngineError>(state.validate_stop()?.then_some(Action::Stop {
                requested_at,
                estop: None,
            }))
        })?;
        Ok(())
    }

    pub fn resume_from_recovery(&self, how: ResumeAction) -> Result<(), EngineError> {
        let resolution = match how {
            ResumeAction::Continue => RecoveryResolution::Continue,
            ResumeAction::Retry => RecoveryResolution::Retry {
                command_id: self.dispatcher.ids().command_id(),
                created_at: self.dispatcher.clock().now(),
            },
        };
        self.dispatcher.dispatch_with(|state| {
            state.validate_resume_from_recovery(&resolution)?;
            Ok::<_, EngineError>(Some(Action::ResumeFromRecovery { resolution }))
        })?;
        Ok(())
    }

    /// End the run without waiting for the queue to drain.
    ///
    /// With `error` the run fails; otherwise it succeeds.
    pub fn finish(&self, error: Option<ErrorOccurrence>) -> Result<(), EngineError> {
        self.dispatcher.dispatch_with(|state| {
            Ok::<_, EngineError>(state.validate_finish()?.then_some(Action::Finish {
                error,
                set_run_status: true,
            }))
        })?;
        Ok(())
    }

    pub fn set_error_recovery_policy(&self, policy: ErrorRecoveryPolicy) -> Result<(), EngineError> {
        self.dispatcher
            .dispatch(Action::SetErrorRecoveryPolicy { policy })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
