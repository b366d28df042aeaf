//! Process configuration for the `verdant-monitor` binary.

use std::collections::HashMap;
use std::path::PathBuf;

use verdant_core::dedup::DEFAULT_CAPACITY;
use verdant_core::error::CoreError;
use verdant_core::recipient::Recipient;

use crate::recipients::parse_owner_map;

const DEFAULT_SETTINGS_PATH: &str = "notification_settings.json";
const DEFAULT_SNAPSHOT_PATH: &str = "garden.json";

/// Monitor configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// JSON file holding [`NotificationSettings`](verdant_core::settings::NotificationSettings).
    pub settings_path: PathBuf,
    /// JSON snapshot with subjects and their latest readings.
    pub snapshot_path: PathBuf,
    /// Catch-all recipient for owners without their own entry.
    pub default_recipient: Option<Recipient>,
    pub owner_recipients: HashMap<String, Recipient>,
    /// `(latitude, longitude)` for live Open-Meteo forecasts.
    pub forecast_location: Option<(f64, f64)>,
    pub dedup_capacity: usize,
}

impl MonitorConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default                      |
    /// |------------------------|------------------------------|
    /// | `SETTINGS_PATH`        | `notification_settings.json` |
    /// | `GARDEN_SNAPSHOT_PATH` | `garden.json`                |
    /// | `ALERT_RECIPIENT`      | unset                        |
    /// | `ALERT_RECIPIENTS`     | unset (`owner=address,...`)  |
    /// | `FORECAST_LATITUDE`    | unset                        |
    /// | `FORECAST_LONGITUDE`   | unset                        |
    /// | `DEDUP_CAPACITY`       | `100`                        |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let default_recipient = var("ALERT_RECIPIENT")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Recipient::parse(&raw))
            .transpose()?;

        let owner_recipients = match var("ALERT_RECIPIENTS") {
            Some(raw) => parse_owner_map(&raw)?,
            None => HashMap::new(),
        };

        let latitude = var("FORECAST_LATITUDE").map(|v| parse_coordinate("FORECAST_LATITUDE", &v));
        let longitude =
            var("FORECAST_LONGITUDE").map(|v| parse_coordinate("FORECAST_LONGITUDE", &v));
        let forecast_location = match (latitude.transpose()?, longitude.transpose()?) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            (None, None) => None,
            _ => {
                return Err(CoreError::Validation(
                    "FORECAST_LATITUDE and FORECAST_LONGITUDE must be set together".into(),
                ))
            }
        };

        Ok(Self {
            settings_path: var("SETTINGS_PATH")
                .unwrap_or_else(|| DEFAULT_SETTINGS_PATH.into())
                .into(),
            snapshot_path: var("GARDEN_SNAPSHOT_PATH")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.into())
                .into(),
            default_recipient,
            owner_recipients,
            forecast_location,
            dedup_capacity: var("DEDUP_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
        })
    }
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{name} must be a number, got {raw}")))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
