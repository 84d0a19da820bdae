// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temperature, magnetic, and heater-shaker module commands

use super::SuccessData;
use crate::error::CommandError;
use pe_adapters::ModuleControl;
use pe_core::command::{
    EngageParams, ModuleParams, ModuleSubstate, SetShakeSpeedParams, SetTargetTemperatureParams,
};
use pe_core::types::ModuleType;
use pe_core::{CommandResult, State, StateUpdate};
use std::ops::RangeInclusive;

const TEMPERATURE_RANGE: RangeInclusive<f64> = 4.0..=95.0;
const MAGNET_HEIGHT_RANGE: RangeInclusive<f64> = 0.0..=25.0;
const SHAKE_SPEED_RANGE: RangeInclusive<f64> = 200.0..=3000.0;

pub(super) async fn set_target_temperature<M: ModuleControl>(
    params: &SetTargetTemperatureParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::Temperature)?;
    check_range("temperature", params.celsius, "°C", &TEMPERATURE_RANGE)?;
    modules
        .set_target_temperature(&params.module_id, params.celsius)
        .await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::Temperature {
            target_celsius: Some(params.celsius),
        },
    ))
}

pub(super) async fn deactivate_temperature<M: ModuleControl>(
    params: &ModuleParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::Temperature)?;
    modules.deactivate_temperature(&params.module_id).await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::Temperature {
            target_celsius: None,
        },
    ))
}

pub(super) async fn engage_magnet<M: ModuleControl>(
    params: &EngageParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::Magnetic)?;
    check_range("magnet height", params.height, "mm", &MAGNET_HEIGHT_RANGE)?;
    modules
        .engage_magnet(&params.module_id, params.height)
        .await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::Magnetic {
            engaged_height: Some(params.height),
        },
    ))
}

pub(super) async fn disengage_magnet<M: ModuleControl>(
    params: &ModuleParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::Magnetic)?;
    modules.disengage_magnet(&params.module_id).await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::Magnetic {
            engaged_height: None,
        },
    ))
}

pub(super) async fn set_shake_speed<M: ModuleControl>(
    params: &SetShakeSpeedParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::HeaterShaker)?;
    check_range("shake speed", params.rpm, "rpm", &SHAKE_SPEED_RANGE)?;
    modules.set_shake_speed(&params.module_id, params.rpm).await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::HeaterShaker {
            target_rpm: Some(params.rpm),
        },
    ))
}

pub(super) async fn deactivate_shaker<M: ModuleControl>(
    params: &ModuleParams,
    state: &State,
    modules: &M,
) -> Result<SuccessData, CommandError> {
    expect_type(state, &params.module_id, ModuleType::HeaterShaker)?;
    modules.deactivate_shaker(&params.module_id).await?;
    Ok(settled(
        &params.module_id,
        ModuleSubstate::HeaterShaker { target_rpm: None },
    ))
}

fn expect_type(state: &State, module_id: &str, expected: ModuleType) -> Result<(), CommandError> {
    let module = state
        .modules
        .get(module_id)
        .ok_or_else(|| CommandError::ModuleNotLoaded(module_id.to_string()))?;
    let actual = module.module_type();
    if actual != expected {
        return Err(CommandError::WrongModuleType {
            module_id: module_id.to_string(),
            expected,
            actual,
        });
    }
    Ok(())
}

fn check_range(
    what: &str,
    value: f64,
    unit: &str,
    range: &RangeInclusive<f64>,
) -> Result<(), CommandError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(CommandError::InvalidParams(format!(
        "{what} {value} {unit} is outside {}..={} {unit}",
        range.start(),
        range.end()
    )))
}

fn settled(module_id: &str, substate: ModuleSubstate) -> SuccessData {
    SuccessData::new(CommandResult::Empty)
        .with_update(StateUpdate::default().module(module_id, substate))
}

#[cfg(test)]
#[path = "modules_tests.rs"]
mod tests;
