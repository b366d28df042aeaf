//! Monitored subjects and the sensor/forecast readings evaluated for them.
//!
//! Readings are value objects: fetched once per tick, evaluated, then
//! dropped. History lives in whatever store produced them.

use serde::{Deserialize, Serialize};

use crate::types::SubjectId;

/// A plant under monitoring. Owned by the catalog; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredSubject {
    pub id: SubjectId,
    /// Display name used in alert messages, e.g. `"Tomato"`.
    pub name: String,
    /// Owner whose contact address receives the alerts.
    pub owner_id: String,
    /// Disabled subjects are skipped by both soil and weather passes.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl MonitoredSubject {
    /// Create an enabled subject.
    pub fn new(
        id: impl Into<SubjectId>,
        name: impl Into<String>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner_id: owner_id.into(),
            enabled: true,
        }
    }
}

/// Latest soil sensor reading for a single subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub ph: f64,
    pub moisture_pct: f64,
    pub temperature_c: f64,
    /// Nutrient levels in ppm.
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

impl SoilReading {
    /// A reading that breaches every soil band except `ph-high` and
    /// `moisture-high`. Used by manual test triggers.
    pub fn sample_critical() -> Self {
        Self {
            ph: 4.5,
            moisture_pct: 15.0,
            temperature_c: 15.0,
            nitrogen: 0.0,
            phosphorus: 0.0,
            potassium: 0.0,
        }
    }
}

/// Short-range forecast attached to a [`WeatherReading`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub will_rain: bool,
    pub rain_amount_mm: f64,
    pub low_temp_c: f64,
    pub high_temp_c: f64,
}

/// Current conditions plus forecast. Shared by every subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub precipitation_mm: f64,
    pub uv_index: f64,
    pub wind_speed: f64,
    pub forecast: Forecast,
}

impl WeatherReading {
    /// A reading whose forecast trips `rain-heavy`, `frost` and `heat`.
    /// Used by manual test triggers.
    pub fn sample_severe() -> Self {
        Self {
            temperature_c: 18.0,
            humidity_pct: 70.0,
            precipitation_mm: 4.0,
            uv_index: 5.0,
            wind_speed: 20.0,
            forecast: Forecast {
                will_rain: true,
                rain_amount_mm: 25.0,
                low_temp_c: 1.0,
                high_temp_c: 36.0,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
