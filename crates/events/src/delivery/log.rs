//! Log-only transport used when no real transport is configured.

use async_trait::async_trait;
use verdant_core::recipient::Recipient;

use super::{DispatchChannel, DispatchError, Sent};

/// Writes each alert to the tracing log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogChannel;

#[async_trait]
impl DispatchChannel for LogChannel {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError> {
        tracing::info!(to = %recipient, body = message, "Alert (log channel, not delivered)");
        Ok(Sent { channel: "log" })
    }
}
