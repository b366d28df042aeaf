//! One monitoring pass: fetch, evaluate, deduplicate, dispatch.
//!
//! [`AlertEngine`] owns the deduplication set, the only mutable state
//! shared between overlapping ticks. Check-and-record happens under one
//! lock acquisition per subject. Two passes can still both read the set
//! before either records, which may double-dispatch a single alert; that
//! race is accepted.
//!
//! Fetches and sends carry no timeout of their own. A slow collaborator
//! only delays its own pass, which is fine at polling intervals of
//! fifteen minutes or more.

use std::ops::AddAssign;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use verdant_core::alert::{AlertKind, Finding};
use verdant_core::dedup::AlertDeduplicator;
use verdant_core::readings::{MonitoredSubject, SoilReading, WeatherReading};
use verdant_core::recipient::Recipient;
use verdant_core::templates::render_alert;
use verdant_core::thresholds::{evaluate_soil, evaluate_weather};
use verdant_events::{DispatchChannel, DispatchError, Sent};

use crate::error::MonitorError;
use crate::recipients::RecipientResolver;
use crate::sources::{ReadingSource, ReadingUnavailable, SubjectCatalog};

/// Counters for one pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Subjects whose reading was evaluated.
    pub evaluated: usize,
    /// Subjects (or whole passes) skipped for lack of data.
    pub skipped: usize,
    pub dispatched: usize,
    pub suppressed: usize,
    pub failed: usize,
}

impl AddAssign for PassReport {
    fn add_assign(&mut self, other: Self) {
        self.evaluated += other.evaluated;
        self.skipped += other.skipped;
        self.dispatched += other.dispatched;
        self.suppressed += other.suppressed;
        self.failed += other.failed;
    }
}

impl PassReport {
    fn skipped() -> Self {
        Self {
            skipped: 1,
            ..Default::default()
        }
    }
}

/// Collaborators plus the deduplication set.
pub struct AlertEngine {
    source: Arc<dyn ReadingSource>,
    catalog: Arc<dyn SubjectCatalog>,
    recipients: Arc<dyn RecipientResolver>,
    channel: Arc<dyn DispatchChannel>,
    dedup: Mutex<AlertDeduplicator>,
}

impl AlertEngine {
    /// Create an engine with an empty deduplication set of `dedup_capacity` keys.
    pub fn new(
        source: Arc<dyn ReadingSource>,
        catalog: Arc<dyn SubjectCatalog>,
        recipients: Arc<dyn RecipientResolver>,
        channel: Arc<dyn DispatchChannel>,
        dedup_capacity: usize,
    ) -> Self {
        Self {
            source,
            catalog,
            recipients,
            channel,
            dedup: Mutex::new(AlertDeduplicator::new(dedup_capacity)),
        }
    }

    /// Number of alert keys currently suppressed.
    pub async fn suppressed_count(&self) -> usize {
        self.dedup.lock().await.len()
    }

    /// Drop suppression state for a subject leaving monitoring.
    pub async fn forget_subject(&self, subject_id: &str) {
        let cleared = self.dedup.lock().await.reset(subject_id);
        tracing::info!(subject_id, cleared, "Subject removed from monitoring");
    }

    // ---- scheduled passes ----

    /// Evaluate the latest soil reading of every enabled subject.
    pub async fn run_soil_pass(&self) -> PassReport {
        let subjects = match self.enabled_subjects().await {
            Ok(subjects) => subjects,
            Err(e) => {
                tracing::warn!(error = %e, "Subject catalog unavailable, skipping soil pass");
                return PassReport::skipped();
            }
        };

        let reports = join_all(subjects.iter().map(|s| self.soil_pass_for(s))).await;
        let mut total = PassReport::default();
        for report in reports {
            total += report;
        }
        tracing::debug!(?total, "Soil pass complete");
        total
    }

    /// Evaluate the forecast once and fan findings out to every enabled subject.
    pub async fn run_weather_pass(&self) -> PassReport {
        let reading = match self.source.fetch_weather().await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(error = %e, "Weather unavailable, skipping weather pass");
                return PassReport::skipped();
            }
        };
        let findings = evaluate_weather(&reading);

        let subjects = match self.enabled_subjects().await {
            Ok(subjects) => subjects,
            Err(e) => {
                tracing::warn!(error = %e, "Subject catalog unavailable, skipping weather pass");
                return PassReport::skipped();
            }
        };

        let reports = join_all(subjects.iter().map(|subject| {
            let bound = findings
                .iter()
                .cloned()
                .map(|f| f.for_subject(subject.id.clone()))
                .collect();
            self.deliver(subject, AlertKind::Weather, bound)
        }))
        .await;

        let mut total = PassReport::default();
        for report in reports {
            total += report;
        }
        tracing::debug!(?total, "Weather pass complete");
        total
    }

    async fn soil_pass_for(&self, subject: &MonitoredSubject) -> PassReport {
        let reading = match self.source.fetch_soil(&subject.id).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!(
                    subject_id = %subject.id,
                    error = %e,
                    "Soil reading unavailable, skipping subject"
                );
                return PassReport::skipped();
            }
        };

        let findings = evaluate_soil(&reading)
            .into_iter()
            .map(|f| f.for_subject(subject.id.clone()))
            .collect();
        self.deliver(subject, AlertKind::Soil, findings).await
    }

    /// Deduplicate a subject's findings and dispatch the survivors.
    async fn deliver(
        &self,
        subject: &MonitoredSubject,
        kind: AlertKind,
        findings: Vec<Finding>,
    ) -> PassReport {
        let mut report = PassReport {
            evaluated: 1,
            ..Default::default()
        };

        let total = findings.len();
        let fresh = self.retain_fresh(subject, kind, findings).await;
        report.suppressed = total - fresh.len();
        if fresh.is_empty() {
            return report;
        }

        let recipient = self.recipients.resolve(&subject.owner_id).await;
        for finding in &fresh {
            match self.dispatch(subject, recipient.as_ref(), finding).await {
                Ok(sent) => {
                    report.dispatched += 1;
                    tracing::info!(
                        subject_id = %subject.id,
                        category = %finding.category,
                        value = finding.value,
                        channel = sent.channel,
                        "Alert dispatched"
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        subject_id = %subject.id,
                        category = %finding.category,
                        reason = e.category(),
                        error = %e,
                        "Alert dispatch failed"
                    );
                }
            }
        }
        report
    }

    /// Clear resolved keys for this subject and kind, then keep only
    /// findings whose key was not already emitted (recording them).
    async fn retain_fresh(
        &self,
        subject: &MonitoredSubject,
        kind: AlertKind,
        findings: Vec<Finding>,
    ) -> Vec<Finding> {
        let firing: Vec<_> = findings.iter().map(|f| f.category).collect();
        let mut dedup = self.dedup.lock().await;

        let cleared = dedup.clear_resolved(&subject.id, kind, &firing);
        if cleared > 0 {
            tracing::debug!(subject_id = %subject.id, cleared, "Resolved conditions cleared");
        }

        findings
            .into_iter()
            .filter(|finding| {
                let Some(key) = finding.key() else {
                    return false;
                };
                let emit = dedup.should_emit(&key);
                if !emit {
                    tracing::debug!(%key, "Alert suppressed, condition still active");
                }
                emit
            })
            .collect()
    }

    async fn dispatch(
        &self,
        subject: &MonitoredSubject,
        recipient: Option<&Recipient>,
        finding: &Finding,
    ) -> Result<Sent, DispatchError> {
        let recipient =
            recipient.ok_or_else(|| DispatchError::NoRecipient(subject.owner_id.clone()))?;
        let message = render_alert(finding, &subject.name);
        self.channel.send(recipient, &message).await
    }

    // ---- manual triggers ----

    /// Dispatch the alerts a critical soil reading would raise for
    /// `subject_id`, bypassing suppression. Returns how many were sent.
    pub async fn test_soil_alert(&self, subject_id: &str) -> Result<usize, MonitorError> {
        let subject = self.find_subject(subject_id).await?;
        let findings = evaluate_soil(&SoilReading::sample_critical());
        self.dispatch_unsuppressed(&subject, findings).await
    }

    /// Dispatch the alerts a severe forecast would raise for `subject_id`,
    /// bypassing suppression. Returns how many were sent.
    pub async fn test_weather_alert(&self, subject_id: &str) -> Result<usize, MonitorError> {
        let subject = self.find_subject(subject_id).await?;
        let findings = evaluate_weather(&WeatherReading::sample_severe());
        self.dispatch_unsuppressed(&subject, findings).await
    }

    /// Send every finding, reporting the first failure after trying all.
    /// The deduplication set is neither consulted nor updated.
    async fn dispatch_unsuppressed(
        &self,
        subject: &MonitoredSubject,
        findings: Vec<Finding>,
    ) -> Result<usize, MonitorError> {
        let recipient = self
            .recipients
            .resolve(&subject.owner_id)
            .await
            .ok_or_else(|| DispatchError::NoRecipient(subject.owner_id.clone()))?;

        let mut sent = 0;
        let mut first_error = None;
        for finding in findings {
            let finding = finding.for_subject(subject.id.clone());
            match self.dispatch(subject, Some(&recipient), &finding).await {
                Ok(_) => sent += 1,
                Err(e) => {
                    tracing::warn!(
                        subject_id = %subject.id,
                        category = %finding.category,
                        error = %e,
                        "Test alert dispatch failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => {
                tracing::info!(subject_id = %subject.id, sent, "Test alerts dispatched");
                Ok(sent)
            }
        }
    }

    async fn find_subject(&self, subject_id: &str) -> Result<MonitoredSubject, MonitorError> {
        self.catalog
            .list_subjects()
            .await?
            .into_iter()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| MonitorError::UnknownSubject(subject_id.to_string()))
    }

    async fn enabled_subjects(&self) -> Result<Vec<MonitoredSubject>, ReadingUnavailable> {
        let mut subjects = self.catalog.list_subjects().await?;
        subjects.retain(|s| s.enabled);
        Ok(subjects)
    }
}
