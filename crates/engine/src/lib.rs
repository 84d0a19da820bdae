// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pe-engine: runs a protocol against hardware
//!
//! Every state change is an action funnelled through one [`Dispatcher`].
//! A worker task executes queued commands, a forwarder task turns hardware
//! events into actions, and a [`RunController`] accepts control requests
//! from anywhere. [`ProtocolEngine`] ties them together for one run.

pub mod commands;
mod config;
mod controller;
mod dispatcher;
mod engine;
mod error;
mod forwarder;
mod handlers;
mod store;
mod worker;

#[cfg(test)]
mod test_support;

pub use commands::SuccessData;
pub use config::{ConfigError, EngineConfig};
pub use controller::{ResumeAction, RunController};
pub use dispatcher::{ActionHandler, Dispatcher};
pub use engine::{EngineDeps, ProtocolEngine};
pub use error::{CommandError, EngineError, EngineFault, HandlerError};
pub use handlers::{ActionRecorder, TracingHandler};
pub use store::StateStore;
pub use worker::WorkerSettings;
