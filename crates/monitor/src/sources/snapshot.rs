//! JSON snapshot file acting as catalog and reading store.
//!
//! The file is re-read on every fetch, so an external process (sensor
//! bridge, sync job) can update it in place:
//!
//! ```json
//! {
//!   "subjects": [{ "id": "p1", "name": "Tomato", "owner_id": "u1" }],
//!   "soil": { "p1": { "ph": 6.4, "moisture_pct": 41, "temperature_c": 19,
//!                     "nitrogen": 35, "phosphorus": 30, "potassium": 28 } },
//!   "weather": null
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use verdant_core::readings::{MonitoredSubject, SoilReading, WeatherReading};

use super::{OpenMeteoClient, ReadingSource, ReadingUnavailable, SubjectCatalog};

#[derive(Debug, Default, Deserialize)]
struct GardenSnapshot {
    #[serde(default)]
    subjects: Vec<MonitoredSubject>,
    #[serde(default)]
    soil: HashMap<String, SoilReading>,
    #[serde(default)]
    weather: Option<WeatherReading>,
}

/// File-backed [`ReadingSource`] and [`SubjectCatalog`].
///
/// Weather comes from the snapshot's `weather` entry unless a live
/// forecast client is attached with [`with_forecast`](Self::with_forecast).
pub struct SnapshotFileSource {
    path: PathBuf,
    forecast: Option<OpenMeteoClient>,
}

impl SnapshotFileSource {
    /// Create a source reading the snapshot at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            forecast: None,
        }
    }

    /// Take weather from `client` instead of the snapshot.
    pub fn with_forecast(mut self, client: OpenMeteoClient) -> Self {
        self.forecast = Some(client);
        self
    }

    async fn load(&self) -> Result<GardenSnapshot, ReadingUnavailable> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ReadingUnavailable::new(format!("cannot read {}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            ReadingUnavailable::new(format!("malformed snapshot {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl ReadingSource for SnapshotFileSource {
    async fn fetch_soil(&self, subject_id: &str) -> Result<SoilReading, ReadingUnavailable> {
        let mut snapshot = self.load().await?;
        snapshot
            .soil
            .remove(subject_id)
            .ok_or_else(|| ReadingUnavailable::new(format!("no soil reading for {subject_id}")))
    }

    async fn fetch_weather(&self) -> Result<WeatherReading, ReadingUnavailable> {
        if let Some(client) = &self.forecast {
            return client
                .fetch()
                .await
                .map_err(|e| ReadingUnavailable::new(e.to_string()));
        }
        self.load()
            .await?
            .weather
            .ok_or_else(|| ReadingUnavailable::new("no weather in snapshot"))
    }
}

#[async_trait]
impl SubjectCatalog for SnapshotFileSource {
    async fn list_subjects(&self) -> Result<Vec<MonitoredSubject>, ReadingUnavailable> {
        Ok(self.load().await?.subjects)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
