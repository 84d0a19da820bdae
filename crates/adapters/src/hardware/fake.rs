// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake hardware for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{
    catalog, Equipment, Hardware, HardwareError, HardwareEvent, ModuleControl, Movement,
    Pipetting, RailLights, RunControl,
};
use async_trait::async_trait;
use pe_core::types::{
    DeckSlot, LabwareDefinition, ModuleDefinition, ModuleModel, MotorAxis, MountType,
    PipetteConfig, Point,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};

/// Recorded hardware call
#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    MoveTo {
        mount: MountType,
        target: Point,
        minimum_z: Option<f64>,
    },
    Home {
        axes: Option<Vec<MotorAxis>>,
    },
    Aspirate {
        mount: MountType,
        volume: f64,
    },
    Dispense {
        mount: MountType,
        volume: f64,
    },
    BlowOut {
        mount: MountType,
    },
    PickUpTip {
        mount: MountType,
    },
    DropTip {
        mount: MountType,
        home_after: bool,
    },
    LoadLabware {
        load_name: String,
    },
    LoadPipette {
        mount: MountType,
        pipette_name: String,
    },
    LoadModule {
        module_id: String,
        model: ModuleModel,
    },
    SetTargetTemperature {
        module_id: String,
        celsius: f64,
    },
    DeactivateTemperature {
        module_id: String,
    },
    EngageMagnet {
        module_id: String,
        height: f64,
    },
    DisengageMagnet {
        module_id: String,
    },
    SetShakeSpeed {
        module_id: String,
        rpm: f64,
    },
    DeactivateShaker {
        module_id: String,
    },
    WaitForDuration(Duration),
    SetRailLights(bool),
}

impl HardwareCall {
    /// Operation name used to inject failures
    pub fn op(&self) -> &'static str {
        match self {
            HardwareCall::MoveTo { .. } => "move_to",
            HardwareCall::Home { .. } => "home",
            HardwareCall::Aspirate { .. } => "aspirate",
            HardwareCall::Dispense { .. } => "dispense",
            HardwareCall::BlowOut { .. } => "blow_out",
            HardwareCall::PickUpTip { .. } => "pick_up_tip",
            HardwareCall::DropTip { .. } => "drop_tip",
            HardwareCall::LoadLabware { .. } => "load_labware",
            HardwareCall::LoadPipette { .. } => "load_pipette",
            HardwareCall::LoadModule { .. } => "load_module",
            HardwareCall::SetTargetTemperature { .. } => "set_target_temperature",
            HardwareCall::DeactivateTemperature { .. } => "deactivate_temperature",
            HardwareCall::EngageMagnet { .. } => "engage_magnet",
            HardwareCall::DisengageMagnet { .. } => "disengage_magnet",
            HardwareCall::SetShakeSpeed { .. } => "set_shake_speed",
            HardwareCall::DeactivateShaker { .. } => "deactivate_shaker",
            HardwareCall::WaitForDuration(_) => "wait_for_duration",
            HardwareCall::SetRailLights(_) => "set_rail_lights",
        }
    }
}

/// Fake hardware that records calls and fails on request
#[derive(Clone)]
pub struct FakeHardware {
    calls: Arc<Mutex<Vec<HardwareCall>>>,
    failures: Arc<Mutex<HashMap<&'static str, VecDeque<HardwareError>>>>,
    positions: Arc<Mutex<HashMap<MountType, Point>>>,
    wait_gate: Arc<Mutex<Option<Arc<Semaphore>>>>,
    events: broadcast::Sender<HardwareEvent>,
}

impl Default for FakeHardware {
    fn default() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            calls: Arc::default(),
            failures: Arc::default(),
            positions: Arc::default(),
            wait_gate: Arc::default(),
            events,
        }
    }
}

impl FakeHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<HardwareCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of recorded operations, in call order
    pub fn ops(&self) -> Vec<&'static str> {
        self.calls().iter().map(HardwareCall::op).collect()
    }

    /// Fail the next call to `op` with `error`. Queued failures are used in order.
    pub fn fail_next(&self, op: &'static str, error: HardwareError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Make `wait_for_duration` block until [`FakeHardware::release_wait`]
    pub fn hold_waits(&self) {
        *self.wait_gate.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let one held wait finish
    pub fn release_wait(&self) {
        if let Some(gate) = self.wait_gate.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            gate.add_permits(1);
        }
    }

    pub fn send_event(&self, event: HardwareEvent) {
        let _ = self.events.send(event);
    }

    fn record(&self, call: HardwareCall) -> Result<(), HardwareError> {
        let op = call.op();
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        match self
            .failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(op)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Movement for FakeHardware {
    async fn move_to(
        &self,
        mount: MountType,
        target: Point,
        minimum_z: Option<f64>,
    ) -> Result<Point, HardwareError> {
        self.record(HardwareCall::MoveTo {
            mount,
            target,
            minimum_z,
        })?;
        self.positions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(mount, target);
        Ok(target)
    }

    async fn home(&self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError> {
        self.record(HardwareCall::Home {
            axes: axes.map(<[MotorAxis]>::to_vec),
        })?;
        self.positions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        Ok(())
    }

    async fn current_position(&self, mount: MountType) -> Result<Point, HardwareError> {
        Ok(self
            .positions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&mount)
            .copied()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Pipetting for FakeHardware {
    async fn aspirate(
        &self,
        mount: MountType,
        volume: f64,
        _flow_rate: f64,
    ) -> Result<(), HardwareError> {
        self.record(HardwareCall::Aspirate { mount, volume })
    }

    async fn dispense(
        &self,
        mount: MountType,
        volume: f64,
        _flow_rate: f64,
    ) -> Result<(), HardwareError> {
        self.record(HardwareCall::Dispense { mount, volume })
    }

    async fn blow_out(&self, mount: MountType, _flow_rate: f64) -> Result<(), HardwareError> {
        self.record(HardwareCall::BlowOut { mount })
    }

    async fn pick_up_tip(&self, mount: MountType, _tip_length: f64) -> Result<(), HardwareError> {
        self.record(HardwareCall::PickUpTip { mount })
    }

    async fn drop_tip(&self, mount: MountType, home_after: bool) -> Result<(), HardwareError> {
        self.record(HardwareCall::DropTip { mount, home_after })
    }
}

#[async_trait]
impl Equipment for FakeHardware {
    async fn load_labware_definition(
        &self,
        load_name: &str,
        namespace: &str,
        version: u32,
    ) -> Result<LabwareDefinition, HardwareError> {
        self.record(HardwareCall::LoadLabware {
            load_name: load_name.to_string(),
        })?;
        catalog::labware(load_name, namespace, version).ok_or_else(|| {
            HardwareError::UnknownLabware {
                namespace: namespace.to_string(),
                load_name: load_name.to_string(),
                version,
            }
        })
    }

    async fn load_pipette(
        &self,
        mount: MountType,
        pipette_name: &str,
    ) -> Result<PipetteConfig, HardwareError> {
        self.record(HardwareCall::LoadPipette {
            mount,
            pipette_name: pipette_name.to_string(),
        })?;
        catalog::pipette(pipette_name)
            .ok_or_else(|| HardwareError::UnknownPipette(pipette_name.to_string()))
    }

    async fn load_module(
        &self,
        module_id: &str,
        model: ModuleModel,
        _location: DeckSlot,
    ) -> Result<ModuleDefinition, HardwareError> {
        self.record(HardwareCall::LoadModule {
            module_id: module_id.to_string(),
            model,
        })?;
        Ok(catalog::module(model))
    }
}

#[async_trait]
impl ModuleControl for FakeHardware {
    async fn set_target_temperature(
        &self,
        module_id: &str,
        celsius: f64,
    ) -> Result<(), HardwareError> {
        self.record(HardwareCall::SetTargetTemperature {
            module_id: module_id.to_string(),
            celsius,
        })
    }

    async fn deactivate_temperature(&self, module_id: &str) -> Result<(), HardwareError> {
        self.record(HardwareCall::DeactivateTemperature {
            module_id: module_id.to_string(),
        })
    }

    async fn engage_magnet(&self, module_id: &str, height: f64) -> Result<(), HardwareError> {
        self.record(HardwareCall::EngageMagnet {
            module_id: module_id.to_string(),
            height,
        })
    }

    async fn disengage_magnet(&self, module_id: &str) -> Result<(), HardwareError> {
        self.record(HardwareCall::DisengageMagnet {
            module_id: module_id.to_string(),
        })
    }

    async fn set_shake_speed(&self, module_id: &str, rpm: f64) -> Result<(), HardwareError> {
        self.record(HardwareCall::SetShakeSpeed {
            module_id: module_id.to_string(),
            rpm,
        })
    }

    async fn deactivate_shaker(&self, module_id: &str) -> Result<(), HardwareError> {
        self.record(HardwareCall::DeactivateShaker {
            module_id: module_id.to_string(),
        })
    }
}

#[async_trait]
impl RunControl for FakeHardware {
    async fn wait_for_duration(&self, duration: Duration) -> Result<(), HardwareError> {
        self.record(HardwareCall::WaitForDuration(duration))?;
        let gate = self
            .wait_gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(gate) = gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| HardwareError::Communication(e.to_string()))?;
            permit.forget();
        }
        Ok(())
    }
}

#[async_trait]
impl RailLights for FakeHardware {
    async fn set_rail_lights(&self, on: bool) -> Result<(), HardwareError> {
        self.record(HardwareCall::SetRailLights(on))
    }
}

impl Hardware for FakeHardware {
    type Movement = Self;
    type Pipetting = Self;
    type Equipment = Self;
    type Modules = Self;
    type RunControl = Self;
    type RailLights = Self;

    fn movement(&self) -> Self {
        self.clone()
    }

    fn pipetting(&self) -> Self {
        self.clone()
    }

    fn equipment(&self) -> Self {
        self.clone()
    }

    fn modules(&self) -> Self {
        self.clone()
    }

    fn run_control(&self) -> Self {
        self.clone()
    }

    fn rail_lights(&self) -> Self {
        self.clone()
    }

    fn events(&self) -> broadcast::Receiver<HardwareEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
