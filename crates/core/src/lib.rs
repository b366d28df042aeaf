//! Verdant domain core: readings, threshold evaluation, alert
//! deduplication, notification settings and message templates.
//!
//! Everything in this crate is pure and synchronous. Fetching readings,
//! resolving recipients and delivering messages belong to
//! `verdant-monitor` and `verdant-events`.

pub mod alert;
pub mod dedup;
pub mod error;
pub mod readings;
pub mod recipient;
pub mod settings;
pub mod templates;
pub mod thresholds;
pub mod types;
