// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rebuild state from a snapshot and the action log

use crate::log::{ActionLog, LogCorruption, LogError};
use crate::snapshot::Snapshot;
use pe_core::{Action, ReduceError, State, StateConfig};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("snapshot at sequence {snapshot} is ahead of the log (last sequence {log})")]
    SnapshotAhead { snapshot: u64, log: u64 },
}

/// Result of a restore
#[derive(Debug)]
pub struct Restored {
    pub state: State,
    /// Last log sequence reflected in `state`
    pub sequence: u64,
    /// Number of log entries applied on top of the snapshot
    pub replayed: usize,
    /// Entries the reducers rejected, by sequence number
    pub rejected: Vec<(u64, ReduceError)>,
    /// Set when the log ended in a corrupt entry
    pub corruption: Option<LogCorruption>,
}

/// Apply `actions` to `state` in order.
///
/// A rejected action leaves the state as it was, exactly as it did when the
/// engine first dispatched it; the engine fault that followed is itself in
/// the log. Returns the final state and the index and error of each
/// rejected action.
pub fn replay<'a, I>(mut state: State, actions: I) -> (State, Vec<(usize, ReduceError)>)
where
    I: IntoIterator<Item = &'a Action>,
{
    let mut rejected = Vec::new();
    for (index, action) in actions.into_iter().enumerate() {
        match state.reduce(action) {
            Ok(next) => state = next,
            Err(e) => {
                tracing::warn!(index, action = action.name(), error = %e, "replayed action rejected");
                rejected.push((index, e));
            }
        }
    }
    (state, rejected)
}

/// Rebuild the state recorded at `log_path`, starting from `snapshot` when
/// one is given and from a fresh state otherwise.
///
/// A log written by an engine opens with a `Configure` entry carrying the
/// run's settings, which replaces `fallback`. `fallback` only matters for
/// logs without one.
pub fn restore(
    fallback: &StateConfig,
    snapshot: Option<Snapshot>,
    log_path: &Path,
) -> Result<Restored, ReplayError> {
    let contents = ActionLog::read(log_path)?;
    let (initial, from) = match snapshot {
        Some(snapshot) => {
            if snapshot.sequence > contents.last_sequence() {
                return Err(ReplayError::SnapshotAhead {
                    snapshot: snapshot.sequence,
                    log: contents.last_sequence(),
                });
            }
            (snapshot.state, snapshot.sequence)
        }
        None => (State::new(fallback), 0),
    };

    let suffix: Vec<_> = contents
        .entries
        .iter()
        .filter(|e| e.sequence > from)
        .collect();
    let (state, rejected) = replay(initial, suffix.iter().map(|e| &e.action));
    let rejected = rejected
        .into_iter()
        .filter_map(|(index, e)| suffix.get(index).map(|entry| (entry.sequence, e)))
        .collect();

    tracing::info!(
        path = %log_path.display(),
        from,
        replayed = suffix.len(),
        status = %state.status(),
        "state restored"
    );

    Ok(Restored {
        state,
        sequence: contents.last_sequence(),
        replayed: suffix.len(),
        rejected,
        corruption: contents.corruption,
    })
}

#[cfg(test)]
#[path = "replay_tests.rs"]
mod tests;
