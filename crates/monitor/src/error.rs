use verdant_core::error::CoreError;
use verdant_events::DispatchError;

use crate::sources::ReadingUnavailable;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Settings were rejected; the scheduler kept its previous state.
    #[error("Invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error("Monitor is already running")]
    AlreadyRunning,

    #[error("Unknown subject: {0}")]
    UnknownSubject(String),

    #[error(transparent)]
    Unavailable(#[from] ReadingUnavailable),

    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}
