//! Alert message templates, one per [`AlertCategory`].

use crate::alert::{AlertCategory, AlertLevel, Finding};

/// Render the one-line alert for a category.
pub fn render_template(category: AlertCategory, subject_name: &str, value: f64) -> String {
    match category {
        AlertCategory::PhLow => {
            format!("{subject_name}: soil is too acidic (pH {value})")
        }
        AlertCategory::PhHigh => {
            format!("{subject_name}: soil is too alkaline (pH {value})")
        }
        AlertCategory::MoistureLow => {
            format!("{subject_name}: soil moisture is critically low at {value}%")
        }
        AlertCategory::MoistureHigh => {
            format!("{subject_name}: soil is waterlogged at {value}% moisture")
        }
        AlertCategory::NitrogenLow => {
            format!("{subject_name}: nitrogen is low at {value} ppm")
        }
        AlertCategory::PhosphorusLow => {
            format!("{subject_name}: phosphorus is low at {value} ppm")
        }
        AlertCategory::PotassiumLow => {
            format!("{subject_name}: potassium is low at {value} ppm")
        }
        AlertCategory::RainHeavy => {
            format!("{subject_name}: heavy rain expected ({value} mm forecast)")
        }
        AlertCategory::Frost => {
            format!("{subject_name}: frost risk, forecast low of {value}°C")
        }
        AlertCategory::Heat => {
            format!("{subject_name}: extreme heat, forecast high of {value}°C")
        }
    }
}

/// Care actions suggested alongside an alert.
pub fn recommendations(category: AlertCategory) -> &'static [&'static str] {
    match category {
        AlertCategory::PhLow => &[
            "Add lime to raise pH",
            "Test soil pH weekly",
        ],
        AlertCategory::PhHigh => &[
            "Add sulfur to lower pH",
            "Use acidic fertilizers",
            "Add organic matter",
        ],
        AlertCategory::MoistureLow => &[
            "Water immediately and deeply",
            "Check the irrigation system",
            "Add water-retaining mulch",
        ],
        AlertCategory::MoistureHigh => &[
            "Stop watering",
            "Improve drainage",
            "Check for water leaks",
        ],
        AlertCategory::NitrogenLow => &[
            "Apply a nitrogen-rich fertilizer",
            "Work in compost",
        ],
        AlertCategory::PhosphorusLow => &[
            "Apply bone meal or rock phosphate",
        ],
        AlertCategory::PotassiumLow => &[
            "Apply potash or wood ash",
        ],
        AlertCategory::RainHeavy => &[
            "Move potted plants under cover",
            "Ensure beds drain properly",
            "Skip the next scheduled watering",
        ],
        AlertCategory::Frost => &[
            "Cover plants with frost cloth overnight",
            "Mulch to insulate roots",
            "Bring containers indoors",
        ],
        AlertCategory::Heat => &[
            "Provide shade for sensitive plants",
            "Water early in the morning",
            "Mulch to retain moisture",
        ],
    }
}

/// Full message body: severity tag, template line and recommendations.
pub fn render_alert(finding: &Finding, subject_name: &str) -> String {
    let tag = match finding.category.level() {
        AlertLevel::Critical => "CRITICAL",
        AlertLevel::Warning => "WARNING",
    };
    let mut body = format!(
        "[{tag}] {}",
        render_template(finding.category, subject_name, finding.value)
    );
    for rec in recommendations(finding.category) {
        body.push_str("\n- ");
        body.push_str(rec);
    }
    body
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
