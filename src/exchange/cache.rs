//! In-memory downstream token cache.
//!
//! Entries are keyed per user per resource. Keying without the user
//! dimension would hand one user's downstream token to another, so the
//! identity is a mandatory key component. Stale entries are never
//! returned and are silently replaced by the next successful exchange;
//! there is no eviction task.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

/// Seconds a token must still be valid for to be served from cache.
pub const EXPIRATION_BUFFER_SECS: i64 = 30;

/// Composite key uniquely identifying one cached token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Downstream resource the token is scoped to
    pub resource_id: String,
    /// Identity derived from the inbound user token
    pub user_identity: String,
}

impl CacheKey {
    /// Build a key from a resource and a user identity.
    #[must_use]
    pub fn new(resource_id: impl Into<String>, user_identity: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            user_identity: user_identity.into(),
        }
    }
}

/// A downstream token together with its expiry. Replaced wholesale on
/// refresh, never partially updated.
#[derive(Debug, Clone)]
pub struct CachedCredential {
    /// The downstream bearer token
    pub access_token: String,
    /// Resource the token was issued for
    pub resource_id: String,
    /// Absolute expiry reported by the authority
    pub expires_on: DateTime<Utc>,
}

impl CachedCredential {
    /// Create a new cached credential.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        resource_id: impl Into<String>,
        expires_on: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            resource_id: resource_id.into(),
            expires_on,
        }
    }

    /// Whether the token is still usable: expiry must be more than the
    /// buffer in the future.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.expires_on - chrono::Duration::seconds(EXPIRATION_BUFFER_SECS) > Utc::now()
    }
}

/// Concurrency-safe token cache owned by one resolver instance.
#[derive(Debug, Default)]
pub struct TokenCache {
    entries: RwLock<HashMap<CacheKey, CachedCredential>>,
}

impl TokenCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an entry if present and still fresh. Stale entries are
    /// treated as absent.
    #[must_use]
    pub fn get_fresh(&self, key: &CacheKey) -> Option<CachedCredential> {
        self.entries
            .read()
            .get(key)
            .filter(|entry| entry.is_fresh())
            .cloned()
    }

    /// Insert or overwrite an entry. Last write wins.
    pub fn insert(&self, key: CacheKey, credential: CachedCredential) {
        self.entries.write().insert(key, credential);
    }

    /// Number of entries, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
