// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action dispatcher
//!
//! Every state change funnels through [`Dispatcher::dispatch_with`]. Under a
//! single lock it decides on an action from the current state, shows the
//! action to each handler in registration order, and finally reduces it
//! into the next snapshot. Nothing in here awaits.

use crate::error::{EngineFault, HandlerError};
use crate::store::StateStore;
use pe_core::{Action, Clock, ErrorCode, ErrorOccurrence, IdGen, State};
use chrono::{DateTime, Utc};
use std::cell::Cell;
use std::sync::{Arc, Mutex};

/// Observes each action before it is applied
pub trait ActionHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// `state` is the snapshot the action is about to be applied to
    fn handle(&self, action: &Action, state: &State) -> Result<(), HandlerError>;
}

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
    static REENTERED: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as dispatching until dropped
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<Self> {
        DISPATCHING.with(|active| {
            if active.get() {
                None
            } else {
                active.set(true);
                Some(DispatchGuard)
            }
        })
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.with(|active| active.set(false));
    }
}

pub struct Dispatcher<C: Clock, I: IdGen> {
    handlers: Mutex<Vec<Box<dyn ActionHandler>>>,
    store: StateStore,
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGen> Dispatcher<C, I> {
    pub fn new(initial: State, handlers: Vec<Box<dyn ActionHandler>>, clock: C, ids: I) -> Self {
        Self {
            handlers: Mutex::new(handlers),
            store: StateStore::new(initial),
            clock,
            ids,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn state(&self) -> Arc<State> {
        self.store.get_state()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn ids(&self) -> &I {
        &self.ids
    }

    pub fn dispatch(&self, action: Action) -> Result<(), EngineFault> {
        self.dispatch_with(|_| Ok::<_, EngineFault>(Some(action)))
            .map(|_| ())
    }

    /// Decide on an action from the current state and apply it, atomically.
    ///
    /// `decide` returns `Ok(None)` when there is nothing to do. Returns the
    /// applied action. A reentrant call from the same thread is rejected, and
    /// the outer dispatch then faults the run.
    pub fn dispatch_with<F, E>(&self, decide: F) -> Result<Option<Action>, E>
    where
        F: FnOnce(&State) -> Result<Option<Action>, E>,
        E: From<EngineFault>,
    {
        let Some(_guard) = DispatchGuard::enter() else {
            let fault = EngineFault::ReentrantDispatch;
            REENTERED.with(|reentered| reentered.set(true));
            tracing::error!(error = %fault, "dispatch rejected");
            return Err(fault.into());
        };
        let handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner());
        let current = self.store.get_state();

        let action = match decide(&current) {
            Ok(Some(action)) => action,
            other => {
                self.fault_if_reentered(&handlers, &current);
                return other;
            }
        };

        match self.apply(&handlers, &current, &action) {
            Ok(next) => {
                self.store.publish(next);
                let latest = self.store.get_state();
                self.fault_if_reentered(&handlers, &latest);
                Ok(Some(action))
            }
            Err(fault) => {
                REENTERED.with(|reentered| reentered.set(false));
                self.fault(&handlers, &current, &fault, completion_of(&action));
                Err(fault.into())
            }
        }
    }

    fn apply(
        &self,
        handlers: &[Box<dyn ActionHandler>],
        current: &State,
        action: &Action,
    ) -> Result<State, EngineFault> {
        for handler in handlers {
            handler
                .handle(action, current)
                .map_err(|source| EngineFault::Handler {
                    handler: handler.name(),
                    action: action.name(),
                    source,
                })?;
        }
        current.reduce(action).map_err(|source| EngineFault::Reduce {
            action: action.name(),
            source,
        })
    }

    fn fault_if_reentered(&self, handlers: &[Box<dyn ActionHandler>], current: &State) {
        if REENTERED.with(|reentered| reentered.replace(false)) {
            self.fault(handlers, current, &EngineFault::ReentrantDispatch, None);
        }
    }

    /// Record and apply an engine fault. Handler failures here are logged
    /// and otherwise ignored; the fault is applied regardless.
    fn fault(
        &self,
        handlers: &[Box<dyn ActionHandler>],
        current: &State,
        fault: &EngineFault,
        completed_at: Option<DateTime<Utc>>,
    ) {
        tracing::error!(error = %fault, "engine fault");
        let error = ErrorOccurrence::new(
            self.ids.next(),
            "EngineFault",
            ErrorCode::EngineFault,
            fault.to_string(),
            self.clock.now(),
        );
        let action = Action::EngineFault {
            error: error.clone(),
            completed_at,
        };
        for handler in handlers {
            if let Err(e) = handler.handle(&action, current) {
                tracing::error!(handler = handler.name(), error = %e, "handler failed on engine fault");
            }
        }
        self.store.publish(current.with_fault(&error, completed_at));
    }
}

/// A run whose completing action faults is still complete
fn completion_of(action: &Action) -> Option<DateTime<Utc>> {
    match action {
        Action::HardwareStopped { completed_at, .. } => Some(*completed_at),
        _ => None,
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
