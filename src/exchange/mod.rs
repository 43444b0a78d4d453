//! On-behalf-of token resolution with caching.

pub mod cache;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::authority::{OboAssertion, TokenAuthority};
use crate::cancel::CancelSignal;
use crate::config::ExchangeConfig;
use crate::credentials::CredentialProvider;
use crate::error::{ExchangeError, ExchangeResult};
use crate::jwt::TokenValidator;

pub use cache::{CacheKey, CachedCredential, TokenCache};

/// Resolves a user's inbound token into a downstream API token,
/// serving from cache while an earlier exchange is still fresh.
///
/// The cache is owned by the resolver instance; scope the resolver to
/// the hosting service rather than sharing it process-wide.
pub struct OboTokenResolver {
    config: ExchangeConfig,
    validator: TokenValidator,
    credentials: Arc<dyn CredentialProvider>,
    authority: Arc<dyn TokenAuthority>,
    cache: TokenCache,
}

impl OboTokenResolver {
    /// Create a resolver over the given collaborators.
    #[must_use]
    pub fn new(
        config: ExchangeConfig,
        credentials: Arc<dyn CredentialProvider>,
        authority: Arc<dyn TokenAuthority>,
    ) -> Self {
        let validator = TokenValidator::new(config.accepted_audiences.clone());
        Self {
            config,
            validator,
            credentials,
            authority,
            cache: TokenCache::new(),
        }
    }

    /// Resolve a downstream token for `resource_id` on behalf of the
    /// user identified by `user_token`.
    ///
    /// A cached token is returned as long as it stays outside the
    /// expiration buffer; otherwise a fresh exchange is performed
    /// against `authority_url` and the result cached under the derived
    /// identity. A token whose claims yield no identity is still
    /// exchanged but never cached.
    ///
    /// Concurrent calls for the same identity may each perform the
    /// exchange; both results are valid and the last write wins.
    ///
    /// # Errors
    ///
    /// Validation failures surface before any exchange is attempted;
    /// credential and authority failures carry the original cause. No
    /// retry happens here.
    #[instrument(skip(self, user_token, cancel), fields(resource = %resource_id))]
    pub async fn get_or_exchange(
        &self,
        authority_url: &str,
        resource_id: &str,
        user_token: &str,
        cancel: CancelSignal,
    ) -> ExchangeResult<String> {
        let claims = self.validator.validate(user_token)?;
        let identity = claims.user_identity();

        if let Some(who) = identity.as_deref() {
            let key = CacheKey::new(resource_id, who);
            if let Some(hit) = self.cache.get_fresh(&key) {
                debug!("serving downstream token from cache");
                return Ok(hit.access_token);
            }
        } else {
            debug!("no user identity in token claims, exchange result will not be cached");
        }

        if cancel.is_cancelled() {
            return Err(ExchangeError::authority("token exchange cancelled"));
        }

        let credential = self
            .credentials
            .get_credential(&self.config.cert_thumbprint)
            .await?;
        let assertion = OboAssertion::new(user_token, identity.as_deref());

        let response = tokio::select! {
            () = cancel.cancelled() => {
                warn!("token exchange cancelled while waiting on authority");
                return Err(ExchangeError::authority("token exchange cancelled"));
            }
            result = self
                .authority
                .acquire_token(authority_url, resource_id, &credential, &assertion) => result?,
        };

        let access_token = response.access_token.clone();
        if let Some(who) = identity {
            self.cache.insert(
                CacheKey::new(resource_id, who),
                CachedCredential::new(response.access_token, resource_id, response.expires_on),
            );
        }

        info!("downstream token exchanged");
        Ok(access_token)
    }

    /// Fresh cached token for a resource and identity, if one exists.
    #[must_use]
    pub fn cached_token(&self, resource_id: &str, user_identity: &str) -> Option<String> {
        self.cache
            .get_fresh(&CacheKey::new(resource_id, user_identity))
            .map(|entry| entry.access_token)
    }

    /// Seed the cache with a token obtained elsewhere.
    pub fn prime_cache(
        &self,
        resource_id: &str,
        user_identity: &str,
        access_token: &str,
        expires_on: DateTime<Utc>,
    ) {
        self.cache.insert(
            CacheKey::new(resource_id, user_identity),
            CachedCredential::new(access_token, resource_id, expires_on),
        );
    }

    /// Number of cache entries, fresh or stale.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
