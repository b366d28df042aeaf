//! User-owned notification settings.
//!
//! Loaded at startup, replaced wholesale through the scheduler's
//! `update_settings`, and persisted externally on every change.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Lower bound for the soil check interval.
pub const MIN_SOIL_INTERVAL_MINUTES: u32 = 15;

/// Lower bound for the weather check interval.
pub const MIN_WEATHER_INTERVAL_MINUTES: u32 = 60;

pub const DEFAULT_SOIL_INTERVAL_MINUTES: u32 = 30;
pub const DEFAULT_WEATHER_INTERVAL_MINUTES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NotificationSettings {
    pub soil_alerts_enabled: bool,
    pub weather_alerts_enabled: bool,
    #[validate(range(
        min = 15,
        message = "soil check interval must be at least 15 minutes"
    ))]
    pub soil_check_interval_minutes: u32,
    #[validate(range(
        min = 60,
        message = "weather check interval must be at least 60 minutes"
    ))]
    pub weather_check_interval_minutes: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            soil_alerts_enabled: true,
            weather_alerts_enabled: true,
            soil_check_interval_minutes: DEFAULT_SOIL_INTERVAL_MINUTES,
            weather_check_interval_minutes: DEFAULT_WEATHER_INTERVAL_MINUTES,
        }
    }
}

impl NotificationSettings {
    /// Reject intervals below their minimum bound.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }

    pub fn soil_interval(&self) -> Duration {
        minutes(self.soil_check_interval_minutes)
    }

    pub fn weather_interval(&self) -> Duration {
        minutes(self.weather_check_interval_minutes)
    }
}

fn minutes(m: u32) -> Duration {
    Duration::from_secs(u64::from(m) * 60)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
