//! Transport selection by recipient type.

use std::sync::Arc;

use async_trait::async_trait;
use verdant_core::recipient::Recipient;

use super::{DispatchChannel, DispatchError, Sent};

/// Routes [`Recipient::Email`] to the email transport and
/// [`Recipient::Sms`] to the SMS transport.
///
/// A missing transport for the recipient's type is reported as a
/// transport failure, unless a fallback channel is configured.
#[derive(Default, Clone)]
pub struct ChannelRouter {
    email: Option<Arc<dyn DispatchChannel>>,
    sms: Option<Arc<dyn DispatchChannel>>,
    fallback: Option<Arc<dyn DispatchChannel>>,
}

impl ChannelRouter {
    /// Create a router with no transports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route email recipients to `channel`.
    pub fn with_email(mut self, channel: Arc<dyn DispatchChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    /// Route SMS recipients to `channel`.
    pub fn with_sms(mut self, channel: Arc<dyn DispatchChannel>) -> Self {
        self.sms = Some(channel);
        self
    }

    /// Used for any recipient type without a dedicated transport.
    pub fn with_fallback(mut self, channel: Arc<dyn DispatchChannel>) -> Self {
        self.fallback = Some(channel);
        self
    }

    fn select(&self, recipient: &Recipient) -> Result<&Arc<dyn DispatchChannel>, DispatchError> {
        let (dedicated, name) = match recipient {
            Recipient::Email(_) => (&self.email, "email"),
            Recipient::Sms(_) => (&self.sms, "sms"),
        };
        dedicated
            .as_ref()
            .or(self.fallback.as_ref())
            .ok_or_else(|| DispatchError::transport(name, "no transport configured"))
    }
}

#[async_trait]
impl DispatchChannel for ChannelRouter {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError> {
        self.select(recipient)?.send(recipient, message).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
