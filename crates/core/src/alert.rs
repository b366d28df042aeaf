//! Alert categories, findings and the deduplication key derived from them.

use std::fmt;

use serde::Serialize;

use crate::types::SubjectId;

/// Severity implied by an [`AlertCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Worth acting on within days.
    Warning,
    /// Plants are at risk now.
    Critical,
}

/// Which monitoring pass produces a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Soil,
    Weather,
}

/// Every threshold breach the evaluator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertCategory {
    PhLow,
    PhHigh,
    MoistureLow,
    MoistureHigh,
    NitrogenLow,
    PhosphorusLow,
    PotassiumLow,
    RainHeavy,
    Frost,
    Heat,
}

impl AlertCategory {
    /// Categories produced by a soil evaluation.
    pub const SOIL: [AlertCategory; 7] = [
        AlertCategory::PhLow,
        AlertCategory::PhHigh,
        AlertCategory::MoistureLow,
        AlertCategory::MoistureHigh,
        AlertCategory::NitrogenLow,
        AlertCategory::PhosphorusLow,
        AlertCategory::PotassiumLow,
    ];

    /// Categories produced by a weather evaluation.
    pub const WEATHER: [AlertCategory; 3] = [
        AlertCategory::RainHeavy,
        AlertCategory::Frost,
        AlertCategory::Heat,
    ];

    /// Stable kebab-case label, e.g. `"moisture-low"`.
    pub fn as_str(self) -> &'static str {
        match self {
            AlertCategory::PhLow => "ph-low",
            AlertCategory::PhHigh => "ph-high",
            AlertCategory::MoistureLow => "moisture-low",
            AlertCategory::MoistureHigh => "moisture-high",
            AlertCategory::NitrogenLow => "nitrogen-low",
            AlertCategory::PhosphorusLow => "phosphorus-low",
            AlertCategory::PotassiumLow => "potassium-low",
            AlertCategory::RainHeavy => "rain-heavy",
            AlertCategory::Frost => "frost",
            AlertCategory::Heat => "heat",
        }
    }

    /// The pass (soil or weather) that produces this category.
    pub fn kind(self) -> AlertKind {
        match self {
            AlertCategory::RainHeavy | AlertCategory::Frost | AlertCategory::Heat => {
                AlertKind::Weather
            }
            _ => AlertKind::Soil,
        }
    }

    /// Severity shown in the rendered alert.
    pub fn level(self) -> AlertLevel {
        match self {
            AlertCategory::MoistureLow
            | AlertCategory::MoistureHigh
            | AlertCategory::RainHeavy
            | AlertCategory::Frost
            | AlertCategory::Heat => AlertLevel::Critical,
            AlertCategory::PhLow
            | AlertCategory::PhHigh
            | AlertCategory::NitrogenLow
            | AlertCategory::PhosphorusLow
            | AlertCategory::PotassiumLow => AlertLevel::Warning,
        }
    }
}

impl fmt::Display for AlertCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single threshold breach for one subject.
///
/// Weather findings are produced without a subject and bound to each
/// subject with [`Finding::for_subject`] when fanned out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub subject_id: Option<SubjectId>,
    pub category: AlertCategory,
    /// The observed value that crossed the band.
    pub value: f64,
}

impl Finding {
    /// Create an unbound finding.
    pub fn new(category: AlertCategory, value: f64) -> Self {
        Self {
            subject_id: None,
            category,
            value,
        }
    }

    /// Bind the finding to a subject.
    pub fn for_subject(mut self, subject_id: impl Into<SubjectId>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Deduplication identity. `None` until the finding is bound to a subject.
    pub fn key(&self) -> Option<AlertKey> {
        self.subject_id
            .as_ref()
            .map(|id| AlertKey::new(id.clone(), self.category))
    }
}

/// Deduplication identity: (subject, category). Independent of the value,
/// so an ongoing condition collapses to one key across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AlertKey {
    pub subject_id: SubjectId,
    pub category: AlertCategory,
}

impl AlertKey {
    /// Create a key for `subject_id` and `category`.
    pub fn new(subject_id: impl Into<SubjectId>, category: AlertCategory) -> Self {
        Self {
            subject_id: subject_id.into(),
            category,
        }
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_id, self.category)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
