//! Threshold evaluation engine for soil and weather readings.
//!
//! Pure logic: no I/O and no suppression. The caller fetches readings,
//! binds findings to subjects and decides what is worth dispatching.
//! Bands are fixed and every comparison is exclusive unless noted.

use crate::alert::{AlertCategory, Finding};
use crate::readings::{SoilReading, WeatherReading};

pub const PH_LOW: f64 = 5.5;
pub const PH_HIGH: f64 = 8.0;
pub const MOISTURE_LOW_PCT: f64 = 20.0;
pub const MOISTURE_HIGH_PCT: f64 = 85.0;
pub const NITROGEN_LOW: f64 = 30.0;
pub const PHOSPHORUS_LOW: f64 = 25.0;
pub const POTASSIUM_LOW: f64 = 25.0;

/// Forecast rain above this amount (with `will_rain`) is heavy.
pub const HEAVY_RAIN_MM: f64 = 20.0;
/// Inclusive: a forecast low of exactly 2 °C is frost.
pub const FROST_LOW_C: f64 = 2.0;
/// Inclusive: a forecast high of exactly 35 °C is heat.
pub const HEAT_HIGH_C: f64 = 35.0;

/// Evaluate a soil reading. Findings are unbound; see [`Finding::for_subject`].
pub fn evaluate_soil(reading: &SoilReading) -> Vec<Finding> {
    let mut findings = Vec::new();

    check(&mut findings, AlertCategory::PhLow, reading.ph, |v| v < PH_LOW);
    check(&mut findings, AlertCategory::PhHigh, reading.ph, |v| v > PH_HIGH);
    check(
        &mut findings,
        AlertCategory::MoistureLow,
        reading.moisture_pct,
        |v| v < MOISTURE_LOW_PCT,
    );
    check(
        &mut findings,
        AlertCategory::MoistureHigh,
        reading.moisture_pct,
        |v| v > MOISTURE_HIGH_PCT,
    );
    check(
        &mut findings,
        AlertCategory::NitrogenLow,
        reading.nitrogen,
        |v| v < NITROGEN_LOW,
    );
    check(
        &mut findings,
        AlertCategory::PhosphorusLow,
        reading.phosphorus,
        |v| v < PHOSPHORUS_LOW,
    );
    check(
        &mut findings,
        AlertCategory::PotassiumLow,
        reading.potassium,
        |v| v < POTASSIUM_LOW,
    );

    findings
}

/// Evaluate a weather reading. Only the forecast participates.
pub fn evaluate_weather(reading: &WeatherReading) -> Vec<Finding> {
    let forecast = &reading.forecast;
    let mut findings = Vec::new();

    if forecast.will_rain {
        check(
            &mut findings,
            AlertCategory::RainHeavy,
            forecast.rain_amount_mm,
            |v| v > HEAVY_RAIN_MM,
        );
    }
    check(
        &mut findings,
        AlertCategory::Frost,
        forecast.low_temp_c,
        |v| v <= FROST_LOW_C,
    );
    check(
        &mut findings,
        AlertCategory::Heat,
        forecast.high_temp_c,
        |v| v >= HEAT_HIGH_C,
    );

    findings
}

fn check(
    findings: &mut Vec<Finding>,
    category: AlertCategory,
    value: f64,
    breached: impl Fn(f64) -> bool,
) {
    if breached(value) {
        findings.push(Finding::new(category, value));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
