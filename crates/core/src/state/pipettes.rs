// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loaded pipettes: mounts, tips, volumes, and last known positions

use crate::command::{CurrentLocation, PipetteLocationUpdate, StateUpdate, TipGeometry};
use crate::error::ReduceError;
use crate::types::{MountType, PipetteConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedPipette {
    pub id: String,
    pub mount: MountType,
    pub config: PipetteConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipetteState {
    pipettes: BTreeMap<String, LoadedPipette>,
    by_mount: BTreeMap<MountType, String>,
    tips: BTreeMap<String, TipGeometry>,
    volumes: BTreeMap<String, f64>,
    locations: BTreeMap<String, CurrentLocation>,
}

impl PipetteState {
    pub(crate) fn apply(&mut self, update: &StateUpdate) -> Result<(), ReduceError> {
        if let Some(loaded) = &update.loaded_pipette {
            if let Some(moved) = self.pipettes.get(&loaded.pipette_id) {
                if moved.mount != loaded.mount {
                    self.by_mount.remove(&moved.mount);
                }
            }
            if let Some(previous) = self.by_mount.insert(loaded.mount, loaded.pipette_id.clone()) {
                if previous != loaded.pipette_id {
                    self.pipettes.remove(&previous);
                    self.tips.remove(&previous);
                    self.volumes.remove(&previous);
                    self.locations.remove(&previous);
                }
            }
            self.pipettes.insert(
                loaded.pipette_id.clone(),
                LoadedPipette {
                    id: loaded.pipette_id.clone(),
                    mount: loaded.mount,
                    config: loaded.config.clone(),
                },
            );
        }

        match &update.pipette_location {
            Some(PipetteLocationUpdate::Moved {
                pipette_id,
                location,
            }) => {
                self.expect_loaded(pipette_id)?;
                self.locations.insert(pipette_id.clone(), location.clone());
            }
            Some(PipetteLocationUpdate::Unknown { pipette_id }) => {
                self.locations.remove(pipette_id);
            }
            Some(PipetteLocationUpdate::ClearAll) => self.locations.clear(),
            None => {}
        }

        if let Some(tip) = &update.pipette_tip {
            self.expect_loaded(&tip.pipette_id)?;
            match tip.tip {
                Some(geometry) => {
                    self.tips.insert(tip.pipette_id.clone(), geometry);
                    self.volumes.insert(tip.pipette_id.clone(), 0.0);
                }
                None => {
                    self.tips.remove(&tip.pipette_id);
                    self.volumes.remove(&tip.pipette_id);
                }
            }
        }

        if let Some(volume) = &update.pipette_volume {
            self.expect_loaded(&volume.pipette_id)?;
            match volume.volume {
                Some(v) => self.volumes.insert(volume.pipette_id.clone(), v),
                None => self.volumes.remove(&volume.pipette_id),
            };
        }
        Ok(())
    }

    fn expect_loaded(&self, pipette_id: &str) -> Result<(), ReduceError> {
        if self.pipettes.contains_key(pipette_id) {
            Ok(())
        } else {
            Err(ReduceError::PipetteNotFound(pipette_id.to_string()))
        }
    }

    pub fn get(&self, id: &str) -> Option<&LoadedPipette> {
        self.pipettes.get(id)
    }

    pub fn all(&self) -> impl Iterator<Item = &LoadedPipette> {
        self.pipettes.values()
    }

    pub fn on_mount(&self, mount: MountType) -> Option<&LoadedPipette> {
        self.by_mount.get(&mount).and_then(|id| self.pipettes.get(id))
    }

    pub fn attached_tip(&self, id: &str) -> Option<TipGeometry> {
        self.tips.get(id).copied()
    }

    pub fn has_tip(&self, id: &str) -> bool {
        self.tips.contains_key(id)
    }

    /// Volume currently held, `None` without a tip
    pub fn aspirated_volume(&self, id: &str) -> Option<f64> {
        self.volumes.get(id).copied()
    }

    /// How much more the pipette can take up with its current tip
    pub fn available_volume(&self, id: &str) -> Option<f64> {
        let pipette = self.pipettes.get(id)?;
        let tip = self.tips.get(id)?;
        let held = self.volumes.get(id).copied().unwrap_or(0.0);
        Some((pipette.config.max_volume.min(tip.volume) - held).max(0.0))
    }

    pub fn current_location(&self, id: &str) -> Option<&CurrentLocation> {
        self.locations.get(id)
    }
}

#[cfg(test)]
#[path = "pipettes_tests.rs"]
mod tests;
