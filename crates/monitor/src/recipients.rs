//! Resolving a subject owner to a contact address.

use std::collections::HashMap;

use async_trait::async_trait;
use verdant_core::error::CoreError;
use verdant_core::recipient::Recipient;

#[async_trait]
pub trait RecipientResolver: Send + Sync {
    /// `None` when the owner has no usable contact address.
    async fn resolve(&self, owner_id: &str) -> Option<Recipient>;
}

/// Fixed owner → recipient map with an optional catch-all.
#[derive(Debug, Default, Clone)]
pub struct StaticRecipientResolver {
    default: Option<Recipient>,
    by_owner: HashMap<String, Recipient>,
}

impl StaticRecipientResolver {
    /// Create a resolver from per-owner entries and an optional catch-all.
    pub fn new(default: Option<Recipient>, by_owner: HashMap<String, Recipient>) -> Self {
        Self { default, by_owner }
    }

    /// Every owner resolves to `recipient`.
    pub fn single(recipient: Recipient) -> Self {
        Self::new(Some(recipient), HashMap::new())
    }
}

#[async_trait]
impl RecipientResolver for StaticRecipientResolver {
    async fn resolve(&self, owner_id: &str) -> Option<Recipient> {
        self.by_owner
            .get(owner_id)
            .or(self.default.as_ref())
            .cloned()
    }
}

/// Parse `owner=address` pairs separated by commas, e.g.
/// `u1=grower@example.com,u2=+16045550199`. Blank entries are ignored.
pub fn parse_owner_map(raw: &str) -> Result<HashMap<String, Recipient>, CoreError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (owner, address) = entry.split_once('=').ok_or_else(|| {
                CoreError::Validation(format!("expected owner=address, got {entry}"))
            })?;
            Ok((owner.trim().to_string(), Recipient::parse(address)?))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
