//! Validated contact addresses for alert delivery.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// E.164-style phone number: optional `+`, 7 to 15 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").expect("valid regex"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
});

/// Where an alert is delivered. The variant selects the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "lowercase")]
pub enum Recipient {
    Sms(String),
    Email(String),
}

impl Recipient {
    /// Parse a free-form contact string. Spaces, dashes and parentheses
    /// are stripped from phone numbers before validation.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let raw = raw.trim();
        if raw.contains('@') {
            if EMAIL_RE.is_match(raw) {
                return Ok(Recipient::Email(raw.to_string()));
            }
            return Err(CoreError::Validation(format!(
                "invalid email address: {raw}"
            )));
        }

        let phone: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();
        if PHONE_RE.is_match(&phone) {
            Ok(Recipient::Sms(phone))
        } else {
            Err(CoreError::Validation(format!("invalid phone number: {raw}")))
        }
    }

    /// The raw phone number or email address.
    pub fn address(&self) -> &str {
        match self {
            Recipient::Sms(a) | Recipient::Email(a) => a,
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.address())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
