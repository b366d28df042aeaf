//! Shared test doubles for the monitor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use verdant_core::readings::{Forecast, MonitoredSubject, SoilReading, WeatherReading};
use verdant_core::recipient::Recipient;
use verdant_events::{DispatchChannel, DispatchError, Sent};
use verdant_monitor::recipients::StaticRecipientResolver;
use verdant_monitor::sources::{ReadingSource, ReadingUnavailable, SubjectCatalog};
use verdant_monitor::AlertEngine;

// ---------------------------------------------------------------------------
// FakeGarden
// ---------------------------------------------------------------------------

/// In-memory subjects and readings, with fetch counters.
#[derive(Default)]
pub struct FakeGarden {
    subjects: Mutex<Vec<MonitoredSubject>>,
    soil: Mutex<HashMap<String, SoilReading>>,
    weather: Mutex<Option<WeatherReading>>,
    catalog_down: AtomicBool,
    pub soil_fetches: AtomicUsize,
    pub weather_fetches: AtomicUsize,
}

impl FakeGarden {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_subject(&self, subject: MonitoredSubject) {
        self.subjects.lock().unwrap().push(subject);
    }

    pub fn set_soil(&self, subject_id: &str, reading: SoilReading) {
        self.soil
            .lock()
            .unwrap()
            .insert(subject_id.to_string(), reading);
    }

    pub fn set_weather(&self, reading: WeatherReading) {
        *self.weather.lock().unwrap() = Some(reading);
    }

    /// While set, listing subjects fails as if the catalog were offline.
    pub fn set_catalog_down(&self, down: bool) {
        self.catalog_down.store(down, Ordering::SeqCst);
    }

    pub fn soil_fetches(&self) -> usize {
        self.soil_fetches.load(Ordering::SeqCst)
    }

    pub fn weather_fetches(&self) -> usize {
        self.weather_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReadingSource for FakeGarden {
    async fn fetch_soil(&self, subject_id: &str) -> Result<SoilReading, ReadingUnavailable> {
        self.soil_fetches.fetch_add(1, Ordering::SeqCst);
        self.soil
            .lock()
            .unwrap()
            .get(subject_id)
            .copied()
            .ok_or_else(|| ReadingUnavailable::new(format!("no soil reading for {subject_id}")))
    }

    async fn fetch_weather(&self) -> Result<WeatherReading, ReadingUnavailable> {
        self.weather_fetches.fetch_add(1, Ordering::SeqCst);
        self.weather
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ReadingUnavailable::new("no forecast"))
    }
}

#[async_trait]
impl SubjectCatalog for FakeGarden {
    async fn list_subjects(&self) -> Result<Vec<MonitoredSubject>, ReadingUnavailable> {
        if self.catalog_down.load(Ordering::SeqCst) {
            return Err(ReadingUnavailable::new("catalog offline"));
        }
        Ok(self.subjects.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// RecordingChannel
// ---------------------------------------------------------------------------

/// Records every message; fails every send while `fail` is set.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(Recipient, String)>>,
    pub fail: AtomicBool,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn recipients(&self) -> Vec<Recipient> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(recipient, _)| recipient.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DispatchChannel for RecordingChannel {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::transport("recording", "gateway down"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), message.to_string()));
        Ok(Sent {
            channel: "recording",
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn grower() -> Recipient {
    Recipient::Email("grower@example.com".into())
}

/// Engine over `garden` and `channel` where every owner resolves to [`grower`].
pub fn engine(garden: &Arc<FakeGarden>, channel: &Arc<RecordingChannel>) -> Arc<AlertEngine> {
    engine_with(
        garden,
        channel,
        StaticRecipientResolver::single(grower()),
    )
}

pub fn engine_with(
    garden: &Arc<FakeGarden>,
    channel: &Arc<RecordingChannel>,
    recipients: StaticRecipientResolver,
) -> Arc<AlertEngine> {
    Arc::new(AlertEngine::new(
        garden.clone(),
        garden.clone(),
        Arc::new(recipients),
        channel.clone(),
        100,
    ))
}

/// A reading inside every band.
pub fn healthy_soil() -> SoilReading {
    SoilReading {
        ph: 6.5,
        moisture_pct: 50.0,
        temperature_c: 20.0,
        nitrogen: 50.0,
        phosphorus: 40.0,
        potassium: 40.0,
    }
}

/// Healthy apart from critically low moisture.
pub fn dry_soil() -> SoilReading {
    SoilReading {
        moisture_pct: 15.0,
        ..healthy_soil()
    }
}

pub fn calm_weather() -> WeatherReading {
    WeatherReading {
        temperature_c: 18.0,
        humidity_pct: 55.0,
        precipitation_mm: 0.0,
        uv_index: 4.0,
        wind_speed: 8.0,
        forecast: Forecast {
            will_rain: false,
            rain_amount_mm: 0.0,
            low_temp_c: 10.0,
            high_temp_c: 24.0,
        },
    }
}

pub fn severe_forecast() -> WeatherReading {
    WeatherReading {
        forecast: Forecast {
            will_rain: true,
            rain_amount_mm: 25.0,
            low_temp_c: 1.0,
            high_temp_c: 36.0,
        },
        ..calm_weather()
    }
}
