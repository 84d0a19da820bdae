// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pe-storage: durable action log and state snapshots
//!
//! The ordered action log, optionally combined with a snapshot of an
//! earlier state, is enough to rebuild a run's state by replay.

mod entry;
mod log;
mod replay;
mod snapshot;

pub use entry::LogEntry;
pub use log::{ActionLog, LogContents, LogCorruption, LogError};
pub use replay::{replay, restore, ReplayError, Restored};
pub use snapshot::{Snapshot, SnapshotError};
