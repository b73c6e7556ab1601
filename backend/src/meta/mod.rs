// Specimen metadata persisted in the data directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::constants::SPECIMEN_FILE;

/// Print parameters of the 3D-printed specimen under test. Informational
/// only; they do not influence acquisition or derivation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecimenParams {
    pub filament: String,
    pub infill_pattern: String,
    pub infill_pct: u8,
    pub layer_height_mm: f32,
    pub nozzle_temp_c: u16,
    pub bed_temp_c: u16,
}

impl Default for SpecimenParams {
    fn default() -> Self {
        Self {
            filament: "PLA".to_string(),
            infill_pattern: "gyroid".to_string(),
            infill_pct: 100,
            layer_height_mm: 0.2,
            nozzle_temp_c: 210,
            bed_temp_c: 60,
        }
    }
}

pub struct SpecimenStore {
    path: PathBuf,
    params: RwLock<SpecimenParams>,
}

impl SpecimenStore {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SPECIMEN_FILE);
        let params = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(params) => params,
                Err(err) => {
                    warn!(?err, path = %path.display(), "specimen file parse failed");
                    SpecimenParams::default()
                }
            },
            Err(_) => SpecimenParams::default(),
        };
        info!(path = %path.display(), "specimen metadata loaded");

        Self {
            path,
            params: RwLock::new(params),
        }
    }

    pub async fn get(&self) -> SpecimenParams {
        self.params.read().await.clone()
    }

    pub async fn set(&self, params: SpecimenParams) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let contents = serde_json::to_string_pretty(&params).map_err(std::io::Error::from)?;
        tokio::fs::write(&self.path, contents).await?;
        *self.params.write().await = params;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store = SpecimenStore::load(dir.path());

        let params = SpecimenParams {
            filament: "PETG".to_string(),
            infill_pct: 40,
            ..SpecimenParams::default()
        };
        store.set(params.clone()).await.unwrap();
        assert_eq!(store.get().await, params);

        let reloaded = SpecimenStore::load(dir.path());
        assert_eq!(reloaded.get().await, params);
    }

    #[tokio::test]
    async fn missing_or_corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SpecimenStore::load(dir.path());
        assert_eq!(store.get().await, SpecimenParams::default());

        std::fs::write(dir.path().join(SPECIMEN_FILE), "{not json").unwrap();
        let store = SpecimenStore::load(dir.path());
        assert_eq!(store.get().await, SpecimenParams::default());
    }
}
