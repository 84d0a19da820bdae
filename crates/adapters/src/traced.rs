// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced hardware wrapper for consistent observability

use crate::hardware::{
    Equipment, Hardware, HardwareError, HardwareEvent, ModuleControl, Movement, Pipetting,
    RailLights, RunControl,
};
use async_trait::async_trait;
use pe_core::types::{
    DeckSlot, LabwareDefinition, ModuleDefinition, ModuleModel, MotorAxis, MountType,
    PipetteConfig, Point,
};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::Instrument;

/// Wrapper that adds tracing to every capability of any [`Hardware`]
#[derive(Clone)]
pub struct TracedHardware<H> {
    inner: H,
}

impl<H> TracedHardware<H> {
    pub fn new(inner: H) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }
}

/// Run `call` inside `span`, logging how long it took and how it ended
async fn traced<T, F>(span: tracing::Span, call: F) -> Result<T, HardwareError>
where
    F: Future<Output = Result<T, HardwareError>>,
{
    async move {
        let start = Instant::now();
        let result = call.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => tracing::debug!(elapsed_ms, "done"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
        }
        result
    }
    .instrument(span)
    .await
}

#[async_trait]
impl<H: Hardware> Movement for TracedHardware<H> {
    async fn move_to(
        &self,
        mount: MountType,
        target: Point,
        minimum_z: Option<f64>,
    ) -> Result<Point, HardwareError> {
        let span = tracing::info_span!(
            "hw.move_to",
            %mount,
            x = target.x,
            y = target.y,
            z = target.z,
            minimum_z
        );
        traced(span, self.inner.movement().move_to(mount, target, minimum_z)).await
    }

    async fn home(&self, axes: Option<&[MotorAxis]>) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.home", axes = ?axes);
        traced(span, self.inner.movement().home(axes)).await
    }

    async fn current_position(&self, mount: MountType) -> Result<Point, HardwareError> {
        let result = self.inner.movement().current_position(mount).await;
        tracing::trace!(%mount, position = ?result.as_ref().ok(), "position");
        result
    }
}

#[async_trait]
impl<H: Hardware> Pipetting for TracedHardware<H> {
    async fn aspirate(
        &self,
        mount: MountType,
        volume: f64,
        flow_rate: f64,
    ) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.aspirate", %mount, volume, flow_rate);
        traced(span, self.inner.pipetting().aspirate(mount, volume, flow_rate)).await
    }

    async fn dispense(
        &self,
        mount: MountType,
        volume: f64,
        flow_rate: f64,
    ) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.dispense", %mount, volume, flow_rate);
        traced(span, self.inner.pipetting().dispense(mount, volume, flow_rate)).await
    }

    async fn blow_out(&self, mount: MountType, flow_rate: f64) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.blow_out", %mount, flow_rate);
        traced(span, self.inner.pipetting().blow_out(mount, flow_rate)).await
    }

    async fn pick_up_tip(&self, mount: MountType, tip_length: f64) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.pick_up_tip", %mount, tip_length);
        traced(span, self.inner.pipetting().pick_up_tip(mount, tip_length)).await
    }

    async fn drop_tip(&self, mount: MountType, home_after: bool) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.drop_tip", %mount, home_after);
        traced(span, self.inner.pipetting().drop_tip(mount, home_after)).await
    }
}

#[async_trait]
impl<H: Hardware> Equipment for TracedHardware<H> {
    async fn load_labware_definition(
        &self,
        load_name: &str,
        namespace: &str,
        version: u32,
    ) -> Result<LabwareDefinition, HardwareError> {
        let span = tracing::info_span!("hw.load_labware", load_name, namespace, version);
        traced(
            span,
            self.inner
                .equipment()
                .load_labware_definition(load_name, namespace, version),
        )
        .await
    }

    async fn load_pipette(
        &self,
        mount: MountType,
        pipette_name: &str,
    ) -> Result<PipetteConfig, HardwareError> {
        let span = tracing::info_span!("hw.load_pipette", %mount, pipette_name);
        traced(span, self.inner.equipment().load_pipette(mount, pipette_name)).await
    }

    async fn load_module(
        &self,
        module_id: &str,
        model: ModuleModel,
        location: DeckSlot,
    ) -> Result<ModuleDefinition, HardwareError> {
        let span = tracing::info_span!("hw.load_module", module_id, ?model, %location);
        traced(
            span,
            self.inner.equipment().load_module(module_id, model, location),
        )
        .await
    }
}

#[async_trait]
impl<H: Hardware> ModuleControl for TracedHardware<H> {
    async fn set_target_temperature(
        &self,
        module_id: &str,
        celsius: f64,
    ) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.set_target_temperature", module_id, celsius);
        traced(
            span,
            self.inner.modules().set_target_temperature(module_id, celsius),
        )
        .await
    }

    async fn deactivate_temperature(&self, module_id: &str) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.deactivate_temperature", module_id);
        traced(span, self.inner.modules().deactivate_temperature(module_id)).await
    }

    async fn engage_magnet(&self, module_id: &str, height: f64) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.engage_magnet", module_id, height);
        traced(span, self.inner.modules().engage_magnet(module_id, height)).await
    }

    async fn disengage_magnet(&self, module_id: &str) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.disengage_magnet", module_id);
        traced(span, self.inner.modules().disengage_magnet(module_id)).await
    }

    async fn set_shake_speed(&self, module_id: &str, rpm: f64) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.set_shake_speed", module_id, rpm);
        traced(span, self.inner.modules().set_shake_speed(module_id, rpm)).await
    }

    async fn deactivate_shaker(&self, module_id: &str) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.deactivate_shaker", module_id);
        traced(span, self.inner.modules().deactivate_shaker(module_id)).await
    }
}

#[async_trait]
impl<H: Hardware> RunControl for TracedHardware<H> {
    async fn wait_for_duration(&self, duration: Duration) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.wait", seconds = duration.as_secs_f64());
        traced(span, self.inner.run_control().wait_for_duration(duration)).await
    }
}

#[async_trait]
impl<H: Hardware> RailLights for TracedHardware<H> {
    async fn set_rail_lights(&self, on: bool) -> Result<(), HardwareError> {
        let span = tracing::info_span!("hw.set_rail_lights", on);
        traced(span, self.inner.rail_lights().set_rail_lights(on)).await
    }
}

impl<H: Hardware> Hardware for TracedHardware<H> {
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
        self.inner.events()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
