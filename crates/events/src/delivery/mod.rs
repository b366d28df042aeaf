//! The dispatch contract and its transports.
//!
//! Transports never panic or bubble transport-specific errors: every
//! ordinary failure comes back as a [`DispatchError`]. Retrying is a
//! transport decision; callers do not retry.

use async_trait::async_trait;
use verdant_core::recipient::Recipient;

pub mod email;
pub mod log;
pub mod router;
pub mod sms;

/// Receipt for a delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sent {
    /// Name of the transport that accepted the message, e.g. `"email"`.
    pub channel: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No contact address could be resolved for the subject's owner.
    #[error("No recipient for owner {0}")]
    NoRecipient(String),

    /// The transport was unavailable or rejected the message.
    #[error("Transport failure on {channel}: {reason}")]
    TransportFailure {
        channel: &'static str,
        reason: String,
    },
}

impl DispatchError {
    /// Stable category label: `no-recipient` or `transport-failure`.
    pub fn category(&self) -> &'static str {
        match self {
            DispatchError::NoRecipient(_) => "no-recipient",
            DispatchError::TransportFailure { .. } => "transport-failure",
        }
    }

    /// Shorthand for [`DispatchError::TransportFailure`].
    pub fn transport(channel: &'static str, reason: impl Into<String>) -> Self {
        DispatchError::TransportFailure {
            channel,
            reason: reason.into(),
        }
    }
}

/// Delivers a rendered alert to a recipient. One outbound message per call.
#[async_trait]
pub trait DispatchChannel: Send + Sync {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
