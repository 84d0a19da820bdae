// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::commands::fixtures::{target, Bench};
use pe_adapters::HardwareCall;
use pe_core::types::MotorAxis;
use pe_core::CommandParams;

#[tokio::test]
async fn move_to_well_travels_above_the_deck() {
    let mut bench = Bench::with_deck().await;
    let expected = bench
        .state
        .well_position("plate", "B2", &Default::default())
        .unwrap();
    let clearance = bench.state.highest_z();

    let success = bench
        .run(CommandParams::MoveToWell(target("plate", "B2")))
        .await
        .unwrap();

    assert_eq!(success.result, CommandResult::Moved { position: expected });
    assert_eq!(
        bench.hw.calls().last(),
        Some(&HardwareCall::MoveTo {
            mount: MountType::Left,
            target: expected,
            minimum_z: Some(clearance),
        })
    );
    let location = bench.state.pipettes.current_location("pip").unwrap();
    assert_eq!(location.well_name.as_deref(), Some("B2"));
    assert_eq!(location.position, expected);
}

#[tokio::test]
async fn move_to_coordinates_forgets_the_well() {
    let mut bench = Bench::with_deck().await;
    let coordinates = Point::new(10.0, 20.0, 30.0);
    bench
        .run(CommandParams::MoveToCoordinates(MoveToCoordinatesParams {
            pipette_id: "pip".into(),
            coordinates,
            minimum_z_height: Some(50.0),
        }))
        .await
        .unwrap();

    let location = bench.state.pipettes.current_location("pip").unwrap();
    assert_eq!(location.labware_id, None);
    assert_eq!(location.position, coordinates);
}

#[tokio::test]
async fn moving_an_unloaded_pipette_fails() {
    let mut bench = Bench::new();
    let err = bench
        .run(CommandParams::MoveToCoordinates(MoveToCoordinatesParams {
            pipette_id: "ghost".into(),
            coordinates: Point::default(),
            minimum_z_height: None,
        }))
        .await
        .unwrap_err();
    assert_eq!(err, CommandError::PipetteNotLoaded("ghost".into()));
    assert!(bench.hw.calls().is_empty());
}

#[tokio::test]
async fn home_clears_every_known_location() {
    let mut bench = Bench::with_deck().await;
    bench
        .run(CommandParams::MoveToWell(target("plate", "A1")))
        .await
        .unwrap();
    assert!(bench.state.pipettes.current_location("pip").is_some());

    bench
        .run(CommandParams::Home(HomeParams {
            axes: Some(vec![MotorAxis::LeftZ]),
        }))
        .await
        .unwrap();

    assert!(bench.state.pipettes.current_location("pip").is_none());
    assert_eq!(
        bench.hw.calls().last(),
        Some(&HardwareCall::Home {
            axes: Some(vec![MotorAxis::LeftZ])
        })
    );
}
