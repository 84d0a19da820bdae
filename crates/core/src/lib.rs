// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pe-core: data model for the protocol execution engine
//!
//! This crate provides:
//! - Commands, their typed parameters, results, and state updates
//! - Actions, the only input to state mutation
//! - The aggregate [`State`] with pure reducers and read-only views
//! - Error records and the error recovery policy
//! - Clock and ID abstractions

pub mod clock;
pub mod id;

pub mod action;
pub mod command;
pub mod error;
pub mod recovery;
pub mod state;
pub mod types;

// Re-exports
pub use action::{Action, PauseSource};
pub use clock::{Clock, FakeClock, SystemClock};
pub use command::{
    Command, CommandId, CommandIntent, CommandParams, CommandRequest, CommandResult,
    CommandStatus, StateUpdate,
};
pub use error::{ControlError, ErrorCategory, ErrorCode, ErrorOccurrence, ReduceError};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use recovery::{ErrorRecoveryPolicy, ErrorRecoveryType, RecoveryResolution};
pub use state::{QueueStatus, RunResult, RunStatus, State, StateConfig};
pub use types::{DoorState, MountType, Point};
