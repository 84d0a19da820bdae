// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::SuccessData;
use crate::error::CommandError;
use pe_adapters::{RailLights, RunControl};
use pe_core::command::{CommentParams, SetRailLightsParams, WaitForDurationParams, WaitForResumeParams};
use pe_core::{CommandResult, StateUpdate};
use std::time::Duration;

pub(super) async fn wait_for_duration<R: RunControl>(
    params: &WaitForDurationParams,
    run_control: &R,
) -> Result<SuccessData, CommandError> {
    let duration = Duration::try_from_secs_f64(params.seconds).map_err(|_| {
        CommandError::InvalidParams(format!(
            "wait duration must be a non-negative number of seconds, got {}",
            params.seconds
        ))
    })?;
    if let Some(message) = &params.message {
        tracing::info!(seconds = params.seconds, note = %message, "waiting");
    }
    run_control.wait_for_duration(duration).await?;
    Ok(SuccessData::new(CommandResult::Empty))
}

/// Succeeds at once; the run pauses when the command settles
pub(super) fn wait_for_resume(params: &WaitForResumeParams) -> SuccessData {
    if let Some(message) = &params.message {
        tracing::info!(note = %message, "waiting for resume");
    }
    SuccessData::new(CommandResult::Empty).with_update(StateUpdate {
        pause_requested: true,
        ..StateUpdate::default()
    })
}

pub(super) fn comment(params: &CommentParams) -> SuccessData {
    tracing::info!(note = %params.message, "comment");
    SuccessData::new(CommandResult::Empty)
}

pub(super) async fn set_rail_lights<L: RailLights>(
    params: &SetRailLightsParams,
    lights: &L,
) -> Result<SuccessData, CommandError> {
    lights.set_rail_lights(params.on).await?;
    Ok(SuccessData::new(CommandResult::Empty))
}

#[cfg(test)]
#[path = "run_control_tests.rs"]
mod tests;
