//! SMS delivery through an HTTP gateway, with exponential-backoff retry.
//!
//! [`SmsDelivery`] POSTs a JSON message (`from`, `to`, `body`) to a
//! gateway URL with a bearer token. Failed attempts are retried up to
//! three times with exponential backoff (1 s, 2 s, 4 s). The retry policy
//! belongs to this transport; the monitoring engine never retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use verdant_core::recipient::Recipient;

use super::{DispatchChannel, DispatchError, Sent};

const CHANNEL: &str = "sms";

/// Backoff before each retry.
const RETRY_DELAYS_SECS: [u64; 3] = [1, 2, 4];

/// Per-attempt request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateways split longer bodies into multiple segments; we cap instead.
const MAX_BODY_CHARS: usize = 1600;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for SMS gateway failures.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("SMS gateway unreachable: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),
}

impl From<SmsError> for DispatchError {
    fn from(e: SmsError) -> Self {
        DispatchError::transport(CHANNEL, e.to_string())
    }
}

// ---------------------------------------------------------------------------
// SmsConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMS gateway.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Endpoint accepting `POST` JSON messages.
    pub gateway_url: String,
    /// Bearer token sent in the `Authorization` header.
    pub api_token: Option<String>,
    /// Sender number or alphanumeric id.
    pub from: String,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMS_GATEWAY_URL` is not set.
    ///
    /// | Variable            | Required | Default   |
    /// |---------------------|----------|-----------|
    /// | `SMS_GATEWAY_URL`   | yes      | unset     |
    /// | `SMS_GATEWAY_TOKEN` | no       | unset     |
    /// | `SMS_FROM`          | no       | `Verdant` |
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("SMS_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url,
            api_token: std::env::var("SMS_GATEWAY_TOKEN").ok(),
            from: std::env::var("SMS_FROM").unwrap_or_else(|_| "Verdant".to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    from: &'a str,
    to: &'a str,
    body: String,
}

// ---------------------------------------------------------------------------
// SmsDelivery
// ---------------------------------------------------------------------------

/// Delivers alerts as text messages through an HTTP SMS gateway.
pub struct SmsDelivery {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsDelivery {
    /// Create a delivery service with a pre-configured HTTP client.
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Deliver a message to a phone number with retry.
    ///
    /// Four attempts in total; the last error is returned.
    pub async fn deliver(&self, to: &str, message: &str) -> Result<(), SmsError> {
        let payload = SmsPayload {
            from: &self.config.from,
            to,
            body: truncate_body(message),
        };

        for (attempt, delay_secs) in RETRY_DELAYS_SECS.iter().enumerate() {
            match self.try_send(&payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        to,
                        error = %e,
                        "SMS delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(*delay_secs)).await;
                }
            }
        }

        match self.try_send(&payload).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!(to, error = %e, "SMS delivery failed after all retries");
                Err(e)
            }
        }
    }

    async fn try_send(&self, payload: &SmsPayload<'_>) -> Result<(), SmsError> {
        let mut request = self.client.post(&self.config.gateway_url).json(payload);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SmsError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl DispatchChannel for SmsDelivery {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError> {
        let Recipient::Sms(number) = recipient else {
            return Err(DispatchError::transport(
                CHANNEL,
                "recipient is not a phone number",
            ));
        };
        self.deliver(number, message).await?;
        tracing::info!(to = %number, "Alert SMS sent");
        Ok(Sent { channel: CHANNEL })
    }
}

fn truncate_body(message: &str) -> String {
    message.chars().take(MAX_BODY_CHARS).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
