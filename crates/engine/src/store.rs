// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Holder of the current state snapshot
//!
//! Only the dispatcher replaces the snapshot. Everyone else reads
//! immutable `Arc<State>` values or watches for new ones.

use pe_core::State;
use std::sync::Arc;
use tokio::sync::watch;

pub struct StateStore {
    current: watch::Sender<Arc<State>>,
}

impl StateStore {
    pub fn new(initial: State) -> Self {
        let (current, _) = watch::channel(Arc::new(initial));
        Self { current }
    }

    pub fn get_state(&self) -> Arc<State> {
        self.current.borrow().clone()
    }

    /// Receiver that sees every snapshot published from now on
    pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
        self.current.subscribe()
    }

    pub(crate) fn publish(&self, next: State) {
        self.current.send_replace(Arc::new(next));
    }
}
