//! Email transport over SMTP (STARTTLS).
//!
//! The relay connection settings and sender mailbox are resolved once in
//! [`EmailDelivery::new`]; each alert becomes one plain-text message whose
//! subject is the alert's first line.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use verdant_core::recipient::Recipient;

use super::{DispatchChannel, DispatchError, Sent};

const CHANNEL: &str = "email";

const SMTP_PORT: u16 = 587;
const FROM_ADDRESS: &str = "alerts@verdant.local";
const SUBJECT_PREFIX: &str = "[Verdant]";

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP relay error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),

    #[error("Could not assemble email: {0}")]
    Message(#[from] lettre::error::Error),
}

impl From<EmailError> for DispatchError {
    fn from(e: EmailError) -> Self {
        DispatchError::transport(CHANNEL, e.to_string())
    }
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_address: String,
    /// Username and password, when the relay requires authentication.
    pub credentials: Option<(String, String)>,
}

impl EmailConfig {
    /// `None` unless `SMTP_HOST` is set.
    ///
    /// | Env Var         | Default                |
    /// |-----------------|------------------------|
    /// | `SMTP_HOST`     | unset                  |
    /// | `SMTP_PORT`     | `587`                  |
    /// | `SMTP_FROM`     | `alerts@verdant.local` |
    /// | `SMTP_USER`     | unset                  |
    /// | `SMTP_PASSWORD` | unset                  |
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| std::env::var(key).ok();
        Some(Self {
            smtp_host: var("SMTP_HOST")?,
            smtp_port: var("SMTP_PORT")
                .and_then(|port| port.parse().ok())
                .unwrap_or(SMTP_PORT),
            from_address: var("SMTP_FROM").unwrap_or_else(|| FROM_ADDRESS.into()),
            credentials: var("SMTP_USER").zip(var("SMTP_PASSWORD")),
        })
    }

    /// Config for `smtp_host` with the default port and sender, no auth.
    pub fn new(smtp_host: impl Into<String>) -> Self {
        Self {
            smtp_host: smtp_host.into(),
            smtp_port: SMTP_PORT,
            from_address: FROM_ADDRESS.into(),
            credentials: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct EmailDelivery {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailDelivery {
    /// Validate the sender and prepare the relay. Does not connect.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let from: Mailbox = config.from_address.parse()?;
        let mut relay = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);
        if let Some((user, password)) = config.credentials {
            relay = relay.credentials(Credentials::new(user, password));
        }
        Ok(Self {
            mailer: relay.build(),
            from,
        })
    }

    /// Send `message` as a plain-text email to `to`.
    pub async fn deliver(&self, to: &str, message: &str) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject_line(message))
            .header(ContentType::TEXT_PLAIN)
            .body(message.to_string())?;
        self.mailer.send(email).await?;
        Ok(())
    }
}

#[async_trait]
impl DispatchChannel for EmailDelivery {
    async fn send(&self, recipient: &Recipient, message: &str) -> Result<Sent, DispatchError> {
        let Recipient::Email(address) = recipient else {
            return Err(DispatchError::transport(
                CHANNEL,
                "recipient is not an email address",
            ));
        };
        self.deliver(address, message).await?;
        tracing::info!(to = %address, "Alert email sent");
        Ok(Sent { channel: CHANNEL })
    }
}

fn subject_line(message: &str) -> String {
    match message.lines().next().map(str::trim) {
        Some(first) if !first.is_empty() => format!("{SUBJECT_PREFIX} {first}"),
        _ => format!("{SUBJECT_PREFIX} Plant alert"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
