//! Where subjects and readings come from.
//!
//! Both traits are pull-based and may fail with [`ReadingUnavailable`];
//! the engine treats that as "skip this subject/pass", never as fatal.

use async_trait::async_trait;
use verdant_core::readings::{MonitoredSubject, SoilReading, WeatherReading};

pub mod open_meteo;
pub mod snapshot;

pub use open_meteo::OpenMeteoClient;
pub use snapshot::SnapshotFileSource;

/// A reading (or the subject list) could not be obtained this time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Reading not available: {0}")]
pub struct ReadingUnavailable(pub String);

impl ReadingUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Latest soil reading per subject and the shared weather forecast.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    async fn fetch_soil(&self, subject_id: &str) -> Result<SoilReading, ReadingUnavailable>;

    async fn fetch_weather(&self) -> Result<WeatherReading, ReadingUnavailable>;
}

/// The plant catalog, read-only.
#[async_trait]
pub trait SubjectCatalog: Send + Sync {
    async fn list_subjects(&self) -> Result<Vec<MonitoredSubject>, ReadingUnavailable>;
}
