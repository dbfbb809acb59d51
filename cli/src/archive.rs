//! Persisted explorer state.
//!
//! Only user choices are written: settings, explicit designations and the
//! subnetwork. Candidacy, network and graph are recomputed on restore.

use std::path::Path;

use metanet_core::{Model, Network};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::Result;
use crate::state::{ExplicitSimplifications, ExplorerState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateArchive {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub simplifications: ExplicitSimplifications,
    #[serde(default)]
    pub subnetwork: Network,
    #[serde(default)]
    pub generation: u64,
}

impl StateArchive {
    pub fn capture(state: &ExplorerState) -> Self {
        Self {
            settings: state.settings.clone(),
            simplifications: state.simplifications.clone(),
            subnetwork: state.subnetwork.clone(),
            generation: state.generation,
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let archive: StateArchive = serde_json::from_str(&text)?;
        archive.settings.validate()?;
        info!(
            path = %path.display(),
            generation = archive.generation,
            subnetwork = archive.subnetwork.nodes.len(),
            "read state archive"
        );
        Ok(archive)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!(path = %path.display(), generation = self.generation, "wrote state archive");
        Ok(())
    }

    /// Rebuild a live state against `model`. Subnetwork entries the model
    /// no longer produces are dropped.
    pub fn restore(self, model: Model) -> ExplorerState {
        ExplorerState::restore(
            model,
            self.settings,
            self.simplifications,
            self.subnetwork,
            self.generation,
        )
    }
}
