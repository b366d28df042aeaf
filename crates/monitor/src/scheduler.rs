//! Monitor lifecycle: `Stopped` ⇄ `Running`.
//!
//! Starting arms one `tokio::time::interval` task per enabled category,
//! each with its own period. Every tick spawns its pass as a separate task,
//! so a slow pass never delays the timer and passes may overlap. Stopping
//! cancels the timers only. Passes already in flight run to completion.
//!
//! Settings changes always go through a full stop-then-start; there is no
//! partial reconfiguration of a running timer.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use verdant_core::alert::AlertKind;
use verdant_core::settings::NotificationSettings;
use verdant_core::types::Timestamp;

use crate::engine::AlertEngine;
use crate::error::MonitorError;
use crate::settings_store::SettingsStore;

/// Point-in-time view of the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub running_since: Option<Timestamp>,
    pub settings: NotificationSettings,
    /// Period of the armed soil timer; `None` when disarmed.
    pub soil_interval: Option<Duration>,
    /// Period of the armed weather timer; `None` when disarmed.
    pub weather_interval: Option<Duration>,
    pub suppressed_alerts: usize,
}

/// Timers of a running scheduler. Dropping this cancels them, so a
/// scheduler dropped while running leaves no timer behind.
struct ArmedTimers {
    cancel: CancellationToken,
    since: Timestamp,
    soil: Option<Duration>,
    weather: Option<Duration>,
}

impl ArmedTimers {
    fn disarm(self) {
        drop(self);
    }
}

impl Drop for ArmedTimers {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct SchedulerState {
    settings: NotificationSettings,
    /// `None` while stopped.
    timers: Option<ArmedTimers>,
}

/// Owns the settings and timers driving an [`AlertEngine`].
///
/// Construct once per session and share by reference or `Arc`.
pub struct MonitorScheduler {
    engine: Arc<AlertEngine>,
    store: Arc<dyn SettingsStore>,
    state: Mutex<SchedulerState>,
}

impl MonitorScheduler {
    /// Create a stopped scheduler holding default settings.
    pub fn new(engine: Arc<AlertEngine>, store: Arc<dyn SettingsStore>) -> Self {
        Self {
            engine,
            store,
            state: Mutex::new(SchedulerState {
                settings: NotificationSettings::default(),
                timers: None,
            }),
        }
    }

    /// The engine driven by the timers, for manual passes and triggers.
    pub fn engine(&self) -> &Arc<AlertEngine> {
        &self.engine
    }

    /// Load persisted settings, falling back to defaults when none are
    /// stored or the stored ones are unreadable or invalid.
    pub async fn load_settings(&self) -> NotificationSettings {
        match self.store.load().await {
            Ok(Some(settings)) => match settings.check() {
                Ok(()) => settings,
                Err(e) => {
                    tracing::warn!(error = %e, "Stored settings invalid, using defaults");
                    NotificationSettings::default()
                }
            },
            Ok(None) => NotificationSettings::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using defaults");
                NotificationSettings::default()
            }
        }
    }

    /// `Stopped -> Running`. Invalid settings and a second start are
    /// rejected without changing state.
    pub async fn start(&self, settings: NotificationSettings) -> Result<(), MonitorError> {
        if let Err(e) = settings.check() {
            tracing::warn!(error = %e, "Rejected monitor settings");
            return Err(e.into());
        }

        let mut state = self.state.lock().await;
        if state.timers.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }
        state.timers = Some(self.arm(&settings));
        state.settings = settings;
        tracing::info!(?settings, "Monitor started");
        Ok(())
    }

    /// `Running -> Stopped`. A no-op when already stopped.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        match state.timers.take() {
            Some(timers) => {
                timers.disarm();
                tracing::info!("Monitor stopped");
            }
            None => tracing::debug!("Monitor already stopped"),
        }
    }

    /// Replace the settings and persist them. A running scheduler is
    /// restarted with the new settings; a stopped one stays stopped.
    pub async fn update_settings(&self, settings: NotificationSettings) -> Result<(), MonitorError> {
        if let Err(e) = settings.check() {
            tracing::warn!(error = %e, "Rejected monitor settings");
            return Err(e.into());
        }

        let mut state = self.state.lock().await;
        if let Some(timers) = state.timers.take() {
            timers.disarm();
            state.timers = Some(self.arm(&settings));
            tracing::info!(?settings, "Monitor restarted with new settings");
        }
        state.settings = settings;

        if let Err(e) = self.store.save(&settings).await {
            tracing::warn!(error = %e, "Failed to persist notification settings");
        }
        Ok(())
    }

    /// Whether timers are currently armed.
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.timers.is_some()
    }

    /// The settings last accepted by `start` or `update_settings`.
    pub async fn settings(&self) -> NotificationSettings {
        self.state.lock().await.settings
    }

    /// Snapshot of the lifecycle state, armed intervals and suppression count.
    pub async fn status(&self) -> MonitorStatus {
        let (settings, timers) = {
            let state = self.state.lock().await;
            let timers = state
                .timers
                .as_ref()
                .map(|t| (t.since, t.soil, t.weather));
            (state.settings, timers)
        };
        MonitorStatus {
            running: timers.is_some(),
            running_since: timers.map(|t| t.0),
            settings,
            soil_interval: timers.and_then(|t| t.1),
            weather_interval: timers.and_then(|t| t.2),
            suppressed_alerts: self.engine.suppressed_count().await,
        }
    }

    /// Spawn one timer per enabled category under a shared cancellation token.
    fn arm(&self, settings: &NotificationSettings) -> ArmedTimers {
        let cancel = CancellationToken::new();

        let soil = settings.soil_alerts_enabled.then(|| {
            let period = settings.soil_interval();
            self.spawn_timer(AlertKind::Soil, period, cancel.clone());
            period
        });
        let weather = settings.weather_alerts_enabled.then(|| {
            let period = settings.weather_interval();
            self.spawn_timer(AlertKind::Weather, period, cancel.clone());
            period
        });

        ArmedTimers {
            cancel,
            since: Utc::now(),
            soil,
            weather,
        }
    }

    fn spawn_timer(&self, kind: AlertKind, period: Duration, cancel: CancellationToken) {
        let engine = Arc::clone(&self.engine);
        tokio::spawn(run_timer(kind, period, engine, cancel));
    }
}

/// Tick every `period` (first tick immediately) until cancelled.
async fn run_timer(
    kind: AlertKind,
    period: Duration,
    engine: Arc<AlertEngine>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(?kind, period_secs = period.as_secs(), "Monitor timer armed");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(?kind, "Monitor timer disarmed");
                break;
            }
            _ = interval.tick() => {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let report = match kind {
                        AlertKind::Soil => engine.run_soil_pass().await,
                        AlertKind::Weather => engine.run_weather_pass().await,
                    };
                    if report.dispatched > 0 || report.failed > 0 {
                        tracing::info!(?kind, ?report, "Monitor tick finished");
                    }
                });
            }
        }
    }
}
