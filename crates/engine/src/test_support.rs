// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders shared by the engine's tests

use crate::commands::fixtures::{load_labware, load_pipette, liquid, target, PLATE, TIPRACK};
use crate::config::EngineConfig;
use crate::dispatcher::Dispatcher;
use crate::engine::{EngineDeps, ProtocolEngine};
use pe_adapters::FakeHardware;
use pe_core::command::{CommentParams, WaitForDurationParams};
use pe_core::{
    CommandParams, CommandRequest, FakeClock, MountType, SequentialIdGen, State, StateConfig,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub(crate) type TestDispatcher = Dispatcher<FakeClock, SequentialIdGen>;
pub(crate) type TestEngine = ProtocolEngine<FakeClock, SequentialIdGen>;

pub(crate) fn dispatcher() -> Arc<TestDispatcher> {
    Arc::new(Dispatcher::new(
        State::new(&StateConfig::default()),
        Vec::new(),
        FakeClock::new(),
        SequentialIdGen::new("id"),
    ))
}

/// Defaults, but the run stays open when the queue drains
pub(crate) fn interactive_config() -> EngineConfig {
    EngineConfig {
        finish_when_drained: false,
        ..EngineConfig::default()
    }
}

pub(crate) fn start(config: &EngineConfig, hw: &FakeHardware) -> TestEngine {
    ProtocolEngine::start(
        config,
        EngineDeps {
            hardware: hw.clone(),
            clock: FakeClock::new(),
            ids: SequentialIdGen::new("id"),
            handlers: Vec::new(),
        },
    )
}

/// Fail the test instead of hanging when `future` never resolves
pub(crate) async fn within<T>(future: impl Future<Output = T>) -> T {
    match tokio::time::timeout(Duration::from_secs(5), future).await {
        Ok(value) => value,
        Err(_) => panic!("timed out waiting"),
    }
}

pub(crate) fn comment(message: &str) -> CommandRequest {
    CommandRequest::new(CommandParams::Comment(CommentParams {
        message: message.into(),
    }))
}

pub(crate) fn wait(seconds: f64) -> CommandRequest {
    CommandRequest::new(CommandParams::WaitForDuration(WaitForDurationParams {
        seconds,
        message: None,
    }))
}

/// Load a pipette and labware, pick up a tip, and aspirate from `plate`
pub(crate) fn transfer_setup() -> Vec<CommandRequest> {
    [
        load_pipette("pip", MountType::Left),
        load_labware("tips", TIPRACK, 1),
        load_labware("plate", PLATE, 2),
        CommandParams::PickUpTip(target("tips", "A1")),
        CommandParams::Aspirate(liquid(20.0)),
    ]
    .into_iter()
    .map(CommandRequest::new)
    .collect()
}

/// The first snapshot, current or future, that satisfies `pred`
pub(crate) async fn settled(
    dispatcher: &TestDispatcher,
    mut pred: impl FnMut(&State) -> bool,
) -> Arc<State> {
    let mut updates = dispatcher.store().subscribe();
    let found = match within(updates.wait_for(|state| pred(state))).await {
        Ok(state) => Arc::clone(&state),
        Err(_) => panic!("state store closed"),
    };
    found
}
