//! Verdant condition monitor.
//!
//! Wires the collaborators together:
//!
//! ```text
//! ReadingSource -> thresholds -> AlertDeduplicator -> DispatchChannel
//! ```
//!
//! - [`AlertEngine`]: one soil or weather pass over every monitored
//!   subject, plus manual test triggers.
//! - [`MonitorScheduler`]: start/stop lifecycle and the two independent
//!   timers that drive the engine.
//! - [`sources`], [`recipients`], [`settings_store`]: collaborator traits
//!   and their file/HTTP/in-memory implementations.

pub mod config;
pub mod engine;
pub mod error;
pub mod recipients;
pub mod scheduler;
pub mod settings_store;
pub mod sources;

pub use engine::{AlertEngine, PassReport};
pub use error::MonitorError;
pub use scheduler::{MonitorScheduler, MonitorStatus};
