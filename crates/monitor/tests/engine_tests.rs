//! Integration tests for `AlertEngine` passes and manual triggers.

mod common;

use std::collections::HashMap;

use assert_matches::assert_matches;
use verdant_core::readings::{MonitoredSubject, SoilReading};
use verdant_events::DispatchError;
use verdant_monitor::recipients::StaticRecipientResolver;
use verdant_monitor::{MonitorError, PassReport};

use common::*;

fn tomato_garden() -> std::sync::Arc<FakeGarden> {
    let garden = FakeGarden::new();
    garden.add_subject(MonitoredSubject::new("p1", "Tomato", "u1"));
    garden
}

// ---------------------------------------------------------------------------
// Soil pass
// ---------------------------------------------------------------------------

/// Acidic, dry, nitrogen-poor soil raises three alerts that name the plant
/// and carry the measured values.
#[tokio::test]
async fn tomato_reading_dispatches_three_alerts() {
    let garden = tomato_garden();
    garden.set_soil(
        "p1",
        SoilReading {
            ph: 4.8,
            moisture_pct: 15.0,
            temperature_c: 22.0,
            nitrogen: 25.0,
            phosphorus: 40.0,
            potassium: 35.0,
        },
    );
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_soil_pass().await;

    assert_eq!(
        report,
        PassReport {
            evaluated: 1,
            dispatched: 3,
            ..Default::default()
        }
    );
    let messages = channel.messages();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m.contains("Tomato")));
    let with = |needle: &str| messages.iter().filter(|m| m.contains(needle)).count();
    assert_eq!(with("too acidic (pH 4.8)"), 1);
    assert_eq!(with("moisture is critically low at 15%"), 1);
    assert_eq!(with("nitrogen is low at 25 ppm"), 1);
    assert!(channel.recipients().iter().all(|r| *r == grower()));
}

/// A condition that persists across passes is reported once; after it
/// resolves and recurs it is reported again.
#[tokio::test]
async fn persisting_condition_is_reported_once_until_resolved() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    assert_eq!(engine.run_soil_pass().await.dispatched, 1);
    for _ in 0..2 {
        let report = engine.run_soil_pass().await;
        assert_eq!(report.dispatched, 0);
        assert_eq!(report.suppressed, 1);
    }
    assert_eq!(channel.count(), 1);
    assert_eq!(engine.suppressed_count().await, 1);

    garden.set_soil("p1", healthy_soil());
    assert_eq!(engine.run_soil_pass().await.dispatched, 0);
    assert_eq!(engine.suppressed_count().await, 0);

    garden.set_soil("p1", dry_soil());
    assert_eq!(engine.run_soil_pass().await.dispatched, 1);
    assert_eq!(channel.count(), 2);
}

/// A subject without a reading is skipped and nothing is sent.
#[tokio::test]
async fn missing_reading_skips_subject() {
    let garden = tomato_garden();
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_soil_pass().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.evaluated, 0);
    assert_eq!(channel.count(), 0);
}

/// Disabled subjects are neither fetched nor alerted.
#[tokio::test]
async fn disabled_subject_is_not_evaluated() {
    let garden = FakeGarden::new();
    let mut basil = MonitoredSubject::new("p2", "Basil", "u1");
    basil.enabled = false;
    garden.add_subject(basil);
    garden.set_soil("p2", dry_soil());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_soil_pass().await;

    assert_eq!(report, PassReport::default());
    assert_eq!(garden.soil_fetches(), 0);
    assert_eq!(channel.count(), 0);
}

/// A failed send is counted but the key stays recorded, so the alert is
/// not retried on the next pass.
#[tokio::test]
async fn failed_dispatch_is_not_retried() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    let channel = RecordingChannel::new();
    channel.set_failing(true);
    let engine = engine(&garden, &channel);

    assert_eq!(engine.run_soil_pass().await.failed, 1);

    channel.set_failing(false);
    let report = engine.run_soil_pass().await;
    assert_eq!(report.dispatched, 0);
    assert_eq!(report.suppressed, 1);
}

/// An owner without a contact address counts as a failed dispatch.
#[tokio::test]
async fn unresolved_owner_counts_as_failure() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    let channel = RecordingChannel::new();
    let engine = engine_with(&garden, &channel, StaticRecipientResolver::default());

    let report = engine.run_soil_pass().await;

    assert_eq!(report.failed, 1);
    assert_eq!(channel.count(), 0);
}

/// One subject failing (no recipient, no reading) does not stop the pass
/// for the others.
#[tokio::test]
async fn failures_stay_local_to_their_subject() {
    let garden = FakeGarden::new();
    garden.add_subject(MonitoredSubject::new("p1", "Tomato", "u1"));
    garden.add_subject(MonitoredSubject::new("p2", "Basil", "u2"));
    garden.add_subject(MonitoredSubject::new("p3", "Mint", "u2"));
    garden.set_soil("p1", dry_soil());
    garden.set_soil("p2", dry_soil());
    let channel = RecordingChannel::new();
    let resolver =
        StaticRecipientResolver::new(None, HashMap::from([("u2".to_string(), grower())]));
    let engine = engine_with(&garden, &channel, resolver);

    let report = engine.run_soil_pass().await;

    assert_eq!(
        report,
        PassReport {
            evaluated: 2,
            skipped: 1,
            dispatched: 1,
            suppressed: 0,
            failed: 1,
        }
    );
    let messages = channel.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Basil"));
}

/// An owner without a recipient does not stop weather alerts reaching
/// other subjects in the same pass.
#[tokio::test]
async fn weather_pass_continues_after_missing_recipient() {
    let garden = FakeGarden::new();
    garden.add_subject(MonitoredSubject::new("p1", "Tomato", "u1"));
    garden.add_subject(MonitoredSubject::new("p2", "Basil", "u2"));
    garden.set_weather(severe_forecast());
    let channel = RecordingChannel::new();
    let resolver =
        StaticRecipientResolver::new(None, HashMap::from([("u2".to_string(), grower())]));
    let engine = engine_with(&garden, &channel, resolver);

    let report = engine.run_weather_pass().await;

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.dispatched, 3);
    assert_eq!(report.failed, 3);
    assert!(channel.messages().iter().all(|m| m.contains("Basil")));
}

/// An offline catalog skips the whole pass without fetching readings.
#[tokio::test]
async fn offline_catalog_skips_soil_pass() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    garden.set_catalog_down(true);
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_soil_pass().await;

    assert_eq!(
        report,
        PassReport {
            skipped: 1,
            ..Default::default()
        }
    );
    assert_eq!(garden.soil_fetches(), 0);
    assert_eq!(channel.count(), 0);

    garden.set_catalog_down(false);
    assert_eq!(engine.run_soil_pass().await.dispatched, 1);
}

#[tokio::test]
async fn offline_catalog_skips_weather_pass() {
    let garden = tomato_garden();
    garden.set_weather(severe_forecast());
    garden.set_catalog_down(true);
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_weather_pass().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.evaluated, 0);
    assert_eq!(channel.count(), 0);
    assert_eq!(engine.suppressed_count().await, 0);
}

/// Owners get their own address; others fall back to the default.
#[tokio::test]
async fn alerts_go_to_each_owners_recipient() {
    let garden = tomato_garden();
    garden.add_subject(MonitoredSubject::new("p2", "Basil", "u2"));
    garden.set_soil("p1", dry_soil());
    garden.set_soil("p2", dry_soil());
    let channel = RecordingChannel::new();
    let sms = verdant_core::recipient::Recipient::Sms("+16045550199".into());
    let resolver = StaticRecipientResolver::new(
        Some(grower()),
        HashMap::from([("u2".to_string(), sms.clone())]),
    );
    let engine = engine_with(&garden, &channel, resolver);

    engine.run_soil_pass().await;

    let recipients = channel.recipients();
    assert_eq!(recipients.len(), 2);
    assert!(recipients.contains(&grower()));
    assert!(recipients.contains(&sms));
}

/// Forgetting a subject drops its suppression, so the next pass re-alerts.
#[tokio::test]
async fn forget_subject_clears_suppression() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    engine.run_soil_pass().await;
    engine.forget_subject("p1").await;
    assert_eq!(engine.suppressed_count().await, 0);

    assert_eq!(engine.run_soil_pass().await.dispatched, 1);
    assert_eq!(channel.count(), 2);
}

// ---------------------------------------------------------------------------
// Weather pass
// ---------------------------------------------------------------------------

/// A severe forecast raises rain, frost and heat alerts for every enabled
/// subject, whatever its soil looks like.
#[tokio::test]
async fn severe_forecast_fans_out_to_enabled_subjects() {
    let garden = tomato_garden();
    garden.add_subject(MonitoredSubject::new("p2", "Basil", "u1"));
    let mut mint = MonitoredSubject::new("p3", "Mint", "u1");
    mint.enabled = false;
    garden.add_subject(mint);
    garden.set_weather(severe_forecast());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_weather_pass().await;

    assert_eq!(report.evaluated, 2);
    assert_eq!(report.dispatched, 6);
    assert_eq!(garden.weather_fetches(), 1);
    let messages = channel.messages();
    assert_eq!(messages.iter().filter(|m| m.contains("Tomato")).count(), 3);
    assert_eq!(messages.iter().filter(|m| m.contains("Basil")).count(), 3);
    assert!(!messages.iter().any(|m| m.contains("Mint")));

    assert_eq!(engine.run_weather_pass().await.dispatched, 0);
}

/// Weather and soil suppression are independent: a calm forecast does not
/// clear an active soil alert.
#[tokio::test]
async fn weather_pass_leaves_soil_suppression_alone() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    garden.set_weather(calm_weather());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    engine.run_soil_pass().await;
    assert_eq!(engine.run_weather_pass().await.dispatched, 0);
    assert_eq!(engine.suppressed_count().await, 1);

    assert_eq!(engine.run_soil_pass().await.dispatched, 0);
    assert_eq!(channel.count(), 1);
}

/// No forecast means the whole weather pass is skipped.
#[tokio::test]
async fn missing_forecast_skips_weather_pass() {
    let garden = tomato_garden();
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let report = engine.run_weather_pass().await;

    assert_eq!(report.skipped, 1);
    assert_eq!(channel.count(), 0);
}

// ---------------------------------------------------------------------------
// Manual triggers
// ---------------------------------------------------------------------------

/// Test alerts bypass suppression and leave it untouched.
#[tokio::test]
async fn test_alerts_ignore_suppression() {
    let garden = tomato_garden();
    garden.set_soil("p1", dry_soil());
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);
    engine.run_soil_pass().await;

    assert_eq!(engine.test_soil_alert("p1").await.expect("sent"), 5);
    assert_eq!(engine.test_soil_alert("p1").await.expect("sent"), 5);
    assert_eq!(engine.test_weather_alert("p1").await.expect("sent"), 3);

    assert_eq!(channel.count(), 1 + 5 + 5 + 3);
    assert_eq!(engine.suppressed_count().await, 1);
}

/// Test alerts work for disabled subjects too.
#[tokio::test]
async fn test_alert_reaches_disabled_subject() {
    let garden = FakeGarden::new();
    let mut basil = MonitoredSubject::new("p2", "Basil", "u1");
    basil.enabled = false;
    garden.add_subject(basil);
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    assert_eq!(engine.test_weather_alert("p2").await.expect("sent"), 3);
}

#[tokio::test]
async fn test_alert_reports_transport_failure() {
    let garden = tomato_garden();
    let channel = RecordingChannel::new();
    channel.set_failing(true);
    let engine = engine(&garden, &channel);

    let err = engine.test_soil_alert("p1").await.unwrap_err();
    assert_matches!(
        err,
        MonitorError::Dispatch(DispatchError::TransportFailure { .. })
    );
}

#[tokio::test]
async fn test_alert_reports_missing_recipient() {
    let garden = tomato_garden();
    let channel = RecordingChannel::new();
    let engine = engine_with(&garden, &channel, StaticRecipientResolver::default());

    let err = engine.test_weather_alert("p1").await.unwrap_err();
    assert_matches!(err, MonitorError::Dispatch(DispatchError::NoRecipient(owner)) if owner == "u1");
    assert_eq!(channel.count(), 0);
}

#[tokio::test]
async fn test_alert_rejects_unknown_subject() {
    let garden = tomato_garden();
    let channel = RecordingChannel::new();
    let engine = engine(&garden, &channel);

    let err = engine.test_soil_alert("nope").await.unwrap_err();
    assert_matches!(err, MonitorError::UnknownSubject(id) if id == "nope");
}
