//! JSON persistence for broadcast-collected stations

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::errors::AppResult;
use crate::models::Station;

/// Stations collected from the broadcast stream, and the merge target
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BroadcastStore {
    #[serde(default)]
    pub stations: Vec<Station>,
}

impl BroadcastStore {
    pub fn new(stations: Vec<Station>) -> Self {
        Self { stations }
    }

    pub fn from_json(content: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load the store from `path`; a missing file gives an empty store
    pub async fn load(path: &Path) -> AppResult<Self> {
        if !tokio::fs::try_exists(path).await? {
            warn!(
                "Broadcast store {} not found, starting with no stations",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let mut store = Self::from_json(&content)?;
        let dropped = store.sort_programmes();
        if dropped > 0 {
            warn!(
                "Dropped {} programmes repeating a start time in {}",
                dropped,
                path.display()
            );
        }

        info!(
            "Loaded {} broadcast stations from {}",
            store.stations.len(),
            path.display()
        );
        Ok(store)
    }

    pub async fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, self.to_json()?).await?;

        info!(
            "Saved {} stations with {} programmes to {}",
            self.stations.len(),
            self.programme_count(),
            path.display()
        );
        Ok(())
    }

    /// Put every station's programmes in start order, dropping repeated
    /// start times. Returns the number of entries dropped.
    pub fn sort_programmes(&mut self) -> usize {
        self.stations
            .iter_mut()
            .map(Station::normalize_programmes)
            .sum()
    }

    pub fn programme_count(&self) -> usize {
        self.stations.iter().map(|s| s.programmes.len()).sum()
    }
}
