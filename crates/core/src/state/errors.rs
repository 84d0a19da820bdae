// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Every error occurrence recorded during the run

use crate::action::Action;
use crate::error::ErrorOccurrence;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorState {
    errors: BTreeMap<String, ErrorOccurrence>,
    order: Vec<String>,
}

impl ErrorState {
    pub(crate) fn apply(&mut self, action: &Action) {
        match action {
            Action::FailCommand { error, .. } | Action::EngineFault { error, .. } => self.record(error),
            Action::Stop {
                estop: Some(error), ..
            } => self.record(error),
            Action::Finish {
                error: Some(error), ..
            } => self.record(error),
            Action::HardwareStopped {
                finish_error: Some(error),
                ..
            } => self.record(error),
            _ => {}
        }
    }

    pub(crate) fn record(&mut self, error: &ErrorOccurrence) {
        if self.errors.insert(error.id.clone(), error.clone()).is_none() {
            self.order.push(error.id.clone());
        }
    }

    pub fn get(&self, id: &str) -> Option<&ErrorOccurrence> {
        self.errors.get(id)
    }

    /// All errors in the order they occurred
    pub fn all(&self) -> impl Iterator<Item = &ErrorOccurrence> {
        self.order.iter().filter_map(|id| self.errors.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
