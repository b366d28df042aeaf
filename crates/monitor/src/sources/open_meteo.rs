//! Live weather from the Open-Meteo forecast API (no API key needed).
//!
//! One request fetches current conditions plus today's daily aggregates;
//! the daily row becomes the [`Forecast`] evaluated for rain, frost and
//! heat.

use std::time::Duration;

use serde::Deserialize;
use verdant_core::readings::{Forecast, WeatherReading};

const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// HTTP request timeout for a single forecast fetch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m";
const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,precipitation_sum,weather_code,uv_index_max";

#[derive(Debug, thiserror::Error)]
pub enum OpenMeteoError {
    #[error("Forecast request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Forecast response missing {0}")]
    Missing(&'static str),
}

/// WMO weather codes that mean precipitation falling as liquid:
/// drizzle, rain (incl. freezing), showers and thunderstorms.
fn is_rain_code(code: u16) -> bool {
    matches!(code, 51..=67 | 80..=82 | 95..=99)
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
    daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: Option<f64>,
    relative_humidity_2m: Option<f64>,
    precipitation: Option<f64>,
    wind_speed_10m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
    precipitation_sum: Vec<Option<f64>>,
    weather_code: Vec<Option<u16>>,
    #[serde(default)]
    uv_index_max: Vec<Option<f64>>,
}

fn first<T: Copy>(values: &[Option<T>]) -> Option<T> {
    values.first().copied().flatten()
}

impl ForecastResponse {
    fn into_reading(self) -> Result<WeatherReading, OpenMeteoError> {
        let daily = &self.daily;
        let high = first(&daily.temperature_2m_max).ok_or(OpenMeteoError::Missing("daily max"))?;
        let low = first(&daily.temperature_2m_min).ok_or(OpenMeteoError::Missing("daily min"))?;
        let rain_mm = first(&daily.precipitation_sum).unwrap_or(0.0);
        let code = first(&daily.weather_code).unwrap_or(0);

        let current = &self.current;
        Ok(WeatherReading {
            temperature_c: current
                .temperature_2m
                .ok_or(OpenMeteoError::Missing("current temperature"))?,
            humidity_pct: current.relative_humidity_2m.unwrap_or(0.0),
            precipitation_mm: current.precipitation.unwrap_or(0.0),
            uv_index: first(&daily.uv_index_max).unwrap_or(0.0),
            wind_speed: current.wind_speed_10m.unwrap_or(0.0),
            forecast: Forecast {
                will_rain: is_rain_code(code) || rain_mm > 0.0,
                rain_amount_mm: rain_mm,
                low_temp_c: low,
                high_temp_c: high,
            },
        })
    }
}

/// Forecast client for a fixed location.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

impl OpenMeteoClient {
    /// Create a client for the public Open-Meteo endpoint.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, OpenMeteoError> {
        Self::with_base_url(DEFAULT_BASE_URL, latitude, longitude)
    }

    /// Create a client against another endpoint, e.g. a self-hosted mirror.
    pub fn with_base_url(
        base_url: impl Into<String>,
        latitude: f64,
        longitude: f64,
    ) -> Result<Self, OpenMeteoError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            latitude,
            longitude,
        })
    }

    /// Fetch current conditions and today's forecast.
    pub async fn fetch(&self) -> Result<WeatherReading, OpenMeteoError> {
        let response: ForecastResponse = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let reading = response.into_reading()?;
        tracing::debug!(
            latitude = self.latitude,
            longitude = self.longitude,
            low = reading.forecast.low_temp_c,
            high = reading.forecast.high_temp_c,
            rain_mm = reading.forecast.rain_amount_mm,
            "Fetched Open-Meteo forecast"
        );
        Ok(reading)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
