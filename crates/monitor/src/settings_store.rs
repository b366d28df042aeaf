//! Persistence for [`NotificationSettings`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use verdant_core::settings::NotificationSettings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsStoreError {
    #[error("Settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<NotificationSettings>, SettingsStoreError>;

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsStoreError>;
}

// ---------------------------------------------------------------------------
// JsonSettingsStore
// ---------------------------------------------------------------------------

/// Settings kept as a pretty-printed JSON file.
///
/// Saves go through a sibling temp file and a rename so a crash never
/// leaves a half-written file behind.
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Create a store backed by the file at `path`. Nothing is read yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonSettingsStore {
    async fn load(&self) -> Result<Option<NotificationSettings>, SettingsStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsStoreError> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "Notification settings saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySettingsStore
// ---------------------------------------------------------------------------

/// In-process store for embedding and tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    saved: Mutex<Option<NotificationSettings>>,
}

impl MemorySettingsStore {
    /// Create a store, optionally pre-seeded with saved settings.
    pub fn new(initial: Option<NotificationSettings>) -> Self {
        Self {
            saved: Mutex::new(initial),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<NotificationSettings>, SettingsStoreError> {
        Ok(*self.saved.lock().await)
    }

    async fn save(&self, settings: &NotificationSettings) -> Result<(), SettingsStoreError> {
        *self.saved.lock().await = Some(*settings);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
