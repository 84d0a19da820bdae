// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hardware event forwarder
//!
//! Turns door and emergency-stop notifications into actions, one action per
//! physical change at most.

use crate::dispatcher::Dispatcher;
use crate::error::EngineFault;
use pe_adapters::HardwareEvent;
use pe_core::{Action, Clock, DoorState, ErrorCode, ErrorOccurrence, IdGen, State};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

pub(crate) struct Forwarder<C: Clock, I: IdGen> {
    dispatcher: Arc<Dispatcher<C, I>>,
    events: broadcast::Receiver<HardwareEvent>,
}

impl<C: Clock, I: IdGen> Forwarder<C, I> {
    pub fn new(dispatcher: Arc<Dispatcher<C, I>>, events: broadcast::Receiver<HardwareEvent>) -> Self {
        Self { dispatcher, events }
    }

    pub async fn run(mut self) {
        loop {
            match self.events.recv().await {
                Ok(event) => {
                    if let Err(fault) = self.forward(event) {
                        tracing::error!(?event, error = %fault, "failed to forward hardware event");
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "hardware events dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("hardware event stream closed");
    }

    fn forward(&self, event: HardwareEvent) -> Result<(), EngineFault> {
        let now = self.dispatcher.clock().now();
        let ids = self.dispatcher.ids();
        let applied = self.dispatcher.dispatch_with(|state: &State| {
            let action = match event {
                HardwareEvent::DoorOpened => door_change(state, DoorState::Open),
                HardwareEvent::DoorClosed => door_change(state, DoorState::Closed),
                HardwareEvent::EstopEngaged if !state.run.is_completed() => Some(Action::Stop {
                    requested_at: now,
                    estop: Some(ErrorOccurrence::new(
                        ids.next(),
                        "EStopActivatedError",
                        ErrorCode::EStopActivated,
                        "emergency stop engaged",
                        now,
                    )),
                }),
                HardwareEvent::EstopEngaged | HardwareEvent::EstopDisengaged => None,
            };
            Ok::<_, EngineFault>(action)
        })?;
        match applied {
            Some(action) => tracing::info!(?event, action = action.name(), "hardware event"),
            None => tracing::debug!(?event, "hardware event ignored"),
        }
        Ok(())
    }
}

fn door_change(state: &State, door: DoorState) -> Option<Action> {
    (state.run.door() != door).then_some(Action::DoorChange { door })
}

#[cfg(test)]
#[path = "forwarder_tests.rs"]
mod tests;
