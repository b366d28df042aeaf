//! `verdant-monitor` -- soil and weather alert daemon.
//!
//! Reads subjects and readings from a JSON snapshot (and optionally live
//! forecasts from Open-Meteo), evaluates them on the configured intervals
//! and delivers alerts by SMS or email. Runs until Ctrl-C.
//!
//! See [`MonitorConfig::from_env`], [`EmailConfig::from_env`] and
//! [`SmsConfig::from_env`] for the environment variables.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdant_events::{
    ChannelRouter, DispatchChannel, EmailConfig, EmailDelivery, LogChannel, SmsConfig,
    SmsDelivery,
};
use verdant_monitor::config::MonitorConfig;
use verdant_monitor::recipients::StaticRecipientResolver;
use verdant_monitor::settings_store::JsonSettingsStore;
use verdant_monitor::sources::{OpenMeteoClient, SnapshotFileSource};
use verdant_monitor::{AlertEngine, MonitorScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant_monitor=info,verdant_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = MonitorConfig::from_env()?;

    let mut source = SnapshotFileSource::new(&config.snapshot_path);
    if let Some((latitude, longitude)) = config.forecast_location {
        source = source.with_forecast(OpenMeteoClient::new(latitude, longitude)?);
        tracing::info!(latitude, longitude, "Using Open-Meteo forecasts");
    }
    let source = Arc::new(source);

    let recipients = StaticRecipientResolver::new(
        config.default_recipient.clone(),
        config.owner_recipients.clone(),
    );

    let engine = Arc::new(AlertEngine::new(
        source.clone(),
        source,
        Arc::new(recipients),
        build_channel()?,
        config.dedup_capacity,
    ));
    let store = Arc::new(JsonSettingsStore::new(&config.settings_path));
    let scheduler = MonitorScheduler::new(engine, store);

    let settings = scheduler.load_settings().await;
    scheduler.start(settings).await?;
    tracing::info!(
        snapshot = %config.snapshot_path.display(),
        settings = %config.settings_path.display(),
        "verdant-monitor running"
    );

    tokio::signal::ctrl_c().await?;
    scheduler.stop().await;
    tracing::info!("verdant-monitor shut down");
    Ok(())
}

/// Email and SMS transports where configured; everything else is logged.
fn build_channel() -> anyhow::Result<Arc<dyn DispatchChannel>> {
    let mut router = ChannelRouter::new().with_fallback(Arc::new(LogChannel));

    match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(smtp_host = %config.smtp_host, "Email delivery enabled");
            router = router.with_email(Arc::new(EmailDelivery::new(config)?));
        }
        None => tracing::warn!("SMTP_HOST not set, email alerts will only be logged"),
    }

    match SmsConfig::from_env() {
        Some(config) => {
            tracing::info!(gateway = %config.gateway_url, "SMS delivery enabled");
            router = router.with_sms(Arc::new(SmsDelivery::new(config)?));
        }
        None => tracing::warn!("SMS_GATEWAY_URL not set, SMS alerts will only be logged"),
    }

    Ok(Arc::new(router))
}
