// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulated robot
//!
//! Tracks gantry position, tips, plunger volume, and modules in memory.
//! Motion and waits take `time_scale` times their real duration, so a scale
//! of zero runs protocols instantly.

use super::{
    catalog, Equipment, Hardware, HardwareError, HardwareEvent, ModuleControl, Movement,
    Pipetting, RailLights, RunControl,
};
use async_trait::async_trait;
use pe_core::types::{
    DeckSlot, LabwareDefinition, ModuleDefinition, ModuleModel, ModuleType, MotorAxis, MountType,
    PipetteConfig, Point,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

/// Where every mount rests after homing
pub const HOME_POSITION: Point = Point::new(418.0, 353.0, 218.0);

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Gantry speed used to time simulated moves
    pub speed_mm_per_s: f64,
    /// Multiplier on real durations; zero disables sleeping
    pub time_scale: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            speed_mm_per_s: 400.0,
            time_scale: 0.0,
        }
    }
}

#[derive(Debug)]
struct Instrument {
    config: PipetteConfig,
    tip_length: Option<f64>,
    volume: f64,
}

#[derive(Debug)]
struct AttachedModule {
    model: ModuleModel,
    location: DeckSlot,
}

#[derive(Debug, Default)]
struct Rig {
    instruments: BTreeMap<MountType, Instrument>,
    positions: BTreeMap<MountType, Point>,
    modules: BTreeMap<String, AttachedModule>,
    rail_lights: bool,
    estop: bool,
}

impl Rig {
    fn instrument(&mut self, mount: MountType) -> Result<&mut Instrument, HardwareError> {
        self.instruments
            .get_mut(&mount)
            .ok_or(HardwareError::PipetteNotAttached(mount))
    }

    fn module(&self, module_id: &str, expected: ModuleType) -> Result<&AttachedModule, HardwareError> {
        let module = self
            .modules
            .get(module_id)
            .ok_or_else(|| HardwareError::ModuleNotAttached(module_id.to_string()))?;
        if module.model.module_type() != expected {
            return Err(HardwareError::Module(format!(
                "{module_id} is a {}, not a {expected}",
                module.model.module_type()
            )));
        }
        Ok(module)
    }

    fn ensure_not_estopped(&self) -> Result<(), HardwareError> {
        if self.estop {
            return Err(HardwareError::EstopEngaged);
        }
        Ok(())
    }
}

/// In-memory robot with simulated timing
#[derive(Clone)]
pub struct SimulatedHardware {
    rig: Arc<Mutex<Rig>>,
    config: SimulatorConfig,
    events: broadcast::Sender<HardwareEvent>,
}

impl SimulatedHardware {
    pub fn new(config: SimulatorConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            rig: Arc::new(Mutex::new(Rig::default())),
            config,
            events,
        }
    }

    /// Push a hardware event to subscribers, as a door switch or estop would
    pub fn emit(&self, event: HardwareEvent) {
        {
            let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
            match event {
                HardwareEvent::EstopEngaged => rig.estop = true,
                HardwareEvent::EstopDisengaged => rig.estop = false,
                HardwareEvent::DoorOpened | HardwareEvent::DoorClosed => {}
            }
        }
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn position(&self, mount: MountType) -> Option<Point> {
        self.rig
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .positions
            .get(&mount)
            .copied()
    }

    pub fn has_tip(&self, mount: MountType) -> bool {
        self.rig
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .instruments
            .get(&mount)
            .is_some_and(|i| i.tip_length.is_some())
    }

    pub fn rail_lights_on(&self) -> bool {
        self.rig.lock().unwrap_or_else(|e| e.into_inner()).rail_lights
    }

    async fn pause_for(&self, real: Duration) {
        if self.config.time_scale > 0.0 {
            tokio::time::sleep(seconds(real.as_secs_f64() * self.config.time_scale)).await;
        }
    }

    fn travel_time(&self, distance: f64) -> Duration {
        if self.config.speed_mm_per_s <= 0.0 {
            return Duration::ZERO;
        }
        seconds(distance / self.config.speed_mm_per_s)
    }
}

/// Non-finite or negative durations clamp to zero
fn seconds(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

#[async_trait]
impl Movement for SimulatedHardware {
    async fn move_to(
        &self,
        mount: MountType,
        target: Point,
        minimum_z: Option<f64>,
    ) -> Result<Point, HardwareError> {
        let path = {
            let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
            rig.ensure_not_estopped()?;
            let from = rig.positions.get(&mount).copied().unwrap_or(HOME_POSITION);
            // Arc up to the travel height, across, then down
            let travel_z = minimum_z.unwrap_or(f64::MIN).max(from.z).max(target.z);
            let up = Point::new(from.x, from.y, travel_z);
            let over = Point::new(target.x, target.y, travel_z);
            distance(from, up) + distance(up, over) + distance(over, target)
        };
        self.pause_for(self.travel_time(path)).await;

        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.positions.insert(mount, target);
        Ok(target)
    }

    async fn home(&self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError> {
        self.rig
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ensure_not_estopped()?;
        self.pause_for(self.travel_time(HOME_POSITION.z)).await;

        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        let mounts: Vec<MountType> = match axes {
            None => vec![MountType::Left, MountType::Right],
            Some(axes) => {
                let mut mounts = Vec::new();
                if axes.iter().any(|a| matches!(a, MotorAxis::LeftZ | MotorAxis::X | MotorAxis::Y)) {
                    mounts.push(MountType::Left);
                }
                if axes.iter().any(|a| matches!(a, MotorAxis::RightZ | MotorAxis::X | MotorAxis::Y)) {
                    mounts.push(MountType::Right);
                }
                mounts
            }
        };
        for mount in mounts {
            rig.positions.insert(mount, HOME_POSITION);
        }
        Ok(())
    }

    async fn current_position(&self, mount: MountType) -> Result<Point, HardwareError> {
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        Ok(rig.positions.get(&mount).copied().unwrap_or(HOME_POSITION))
    }
}

#[async_trait]
impl Pipetting for SimulatedHardware {
    async fn aspirate(
        &self,
        mount: MountType,
        volume: f64,
        flow_rate: f64,
    ) -> Result<(), HardwareError> {
        {
            let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
            rig.ensure_not_estopped()?;
            let instrument = rig.instrument(mount)?;
            if instrument.tip_length.is_none() {
                return Err(HardwareError::NoTipAttached(mount));
            }
            if instrument.volume + volume > instrument.config.max_volume {
                return Err(HardwareError::Pipetting(format!(
                    "cannot aspirate {volume} µL with {} µL already held (max {} µL)",
                    instrument.volume, instrument.config.max_volume
                )));
            }
            instrument.volume += volume;
        }
        if flow_rate > 0.0 {
            self.pause_for(seconds(volume / flow_rate)).await;
        }
        Ok(())
    }

    async fn dispense(
        &self,
        mount: MountType,
        volume: f64,
        flow_rate: f64,
    ) -> Result<(), HardwareError> {
        {
            let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
            rig.ensure_not_estopped()?;
            let instrument = rig.instrument(mount)?;
            if instrument.tip_length.is_none() {
                return Err(HardwareError::NoTipAttached(mount));
            }
            if volume > instrument.volume {
                return Err(HardwareError::Pipetting(format!(
                    "cannot dispense {volume} µL, only {} µL held",
                    instrument.volume
                )));
            }
            instrument.volume -= volume;
        }
        if flow_rate > 0.0 {
            self.pause_for(seconds(volume / flow_rate)).await;
        }
        Ok(())
    }

    async fn blow_out(&self, mount: MountType, _flow_rate: f64) -> Result<(), HardwareError> {
        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.ensure_not_estopped()?;
        let instrument = rig.instrument(mount)?;
        if instrument.tip_length.is_none() {
            return Err(HardwareError::NoTipAttached(mount));
        }
        instrument.volume = 0.0;
        Ok(())
    }

    async fn pick_up_tip(&self, mount: MountType, tip_length: f64) -> Result<(), HardwareError> {
        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.ensure_not_estopped()?;
        let instrument = rig.instrument(mount)?;
        if instrument.tip_length.is_some() {
            return Err(HardwareError::TipAlreadyAttached(mount));
        }
        instrument.tip_length = Some(tip_length);
        instrument.volume = 0.0;
        Ok(())
    }

    async fn drop_tip(&self, mount: MountType, home_after: bool) -> Result<(), HardwareError> {
        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.ensure_not_estopped()?;
        let instrument = rig.instrument(mount)?;
        if instrument.tip_length.take().is_none() {
            return Err(HardwareError::NoTipAttached(mount));
        }
        instrument.volume = 0.0;
        if home_after {
            if let Some(position) = rig.positions.get_mut(&mount) {
                position.z = HOME_POSITION.z;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Equipment for SimulatedHardware {
    async fn load_labware_definition(
        &self,
        load_name: &str,
        namespace: &str,
        version: u32,
    ) -> Result<LabwareDefinition, HardwareError> {
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
        let config = catalog::pipette(pipette_name)
            .ok_or_else(|| HardwareError::UnknownPipette(pipette_name.to_string()))?;
        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.instruments.insert(
            mount,
            Instrument {
                config: config.clone(),
                tip_length: None,
                volume: 0.0,
            },
        );
        Ok(config)
    }

    async fn load_module(
        &self,
        module_id: &str,
        model: ModuleModel,
        location: DeckSlot,
    ) -> Result<ModuleDefinition, HardwareError> {
        let mut rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((other, _)) = rig
            .modules
            .iter()
            .find(|(id, m)| m.location == location && id.as_str() != module_id)
        {
            return Err(HardwareError::Module(format!(
                "slot {location} is already occupied by {other}"
            )));
        }
        rig.modules
            .insert(module_id.to_string(), AttachedModule { model, location });
        Ok(catalog::module(model))
    }
}

#[async_trait]
impl ModuleControl for SimulatedHardware {
    async fn set_target_temperature(
        &self,
        module_id: &str,
        celsius: f64,
    ) -> Result<(), HardwareError> {
        if !(4.0..=95.0).contains(&celsius) {
            return Err(HardwareError::Module(format!(
                "temperature {celsius} °C is outside 4-95 °C"
            )));
        }
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.module(module_id, ModuleType::Temperature).map(|_| ())
    }

    async fn deactivate_temperature(&self, module_id: &str) -> Result<(), HardwareError> {
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.module(module_id, ModuleType::Temperature).map(|_| ())
    }

    async fn engage_magnet(&self, module_id: &str, height: f64) -> Result<(), HardwareError> {
        if !(0.0..=25.0).contains(&height) {
            return Err(HardwareError::Module(format!(
                "magnet height {height} mm is outside 0-25 mm"
            )));
        }
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.module(module_id, ModuleType::Magnetic).map(|_| ())
    }

    async fn disengage_magnet(&self, module_id: &str) -> Result<(), HardwareError> {
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.module(module_id, ModuleType::Magnetic).map(|_| ())
    }

    async fn set_shake_speed(&self, module_id: &str, rpm: f64) -> Result<(), HardwareError> {
        if !(200.0..=3000.0).contains(&rpm) {
            return Err(HardwareError::Module(format!(
                "shake speed {rpm} rpm is outside 200-3000 rpm"
            )));
        }
        {
            let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
            rig.module(module_id, ModuleType::HeaterShaker)?;
        }
        // Spin-up
        self.pause_for(Duration::from_secs(2)).await;
        Ok(())
    }

    async fn deactivate_shaker(&self, module_id: &str) -> Result<(), HardwareError> {
        let rig = self.rig.lock().unwrap_or_else(|e| e.into_inner());
        rig.module(module_id, ModuleType::HeaterShaker).map(|_| ())
    }
}

#[async_trait]
impl RunControl for SimulatedHardware {
    async fn wait_for_duration(&self, duration: Duration) -> Result<(), HardwareError> {
        self.pause_for(duration).await;
        Ok(())
    }
}

#[async_trait]
impl RailLights for SimulatedHardware {
    async fn set_rail_lights(&self, on: bool) -> Result<(), HardwareError> {
        self.rig.lock().unwrap_or_else(|e| e.into_inner()).rail_lights = on;
        Ok(())
    }
}

impl Hardware for SimulatedHardware {
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
#[path = "simulated_tests.rs"]
mod tests;
