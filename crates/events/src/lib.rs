//! Verdant alert delivery.
//!
//! - [`DispatchChannel`]: the capability every transport implements:
//!   deliver one rendered message to one [`Recipient`](verdant_core::recipient::Recipient).
//! - [`delivery`]: SMTP email, HTTP SMS gateway and log-only transports.
//! - [`ChannelRouter`]: picks the transport matching the recipient type.

pub mod delivery;

pub use delivery::email::{EmailConfig, EmailDelivery};
pub use delivery::log::LogChannel;
pub use delivery::router::ChannelRouter;
pub use delivery::sms::{SmsConfig, SmsDelivery};
pub use delivery::{DispatchChannel, DispatchError, Sent};
