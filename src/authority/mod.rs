//! External token-issuing authority.

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::credentials::ClientCredential;
use crate::error::ExchangeResult;

pub use http::HttpTokenAuthority;

/// Grant type for on-behalf-of user assertions.
pub const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Client assertion type for certificate-signed client authentication.
pub const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// The user assertion presented to the authority for an OBO exchange.
#[derive(Debug, Clone)]
pub struct OboAssertion {
    /// The inbound user token being exchanged
    pub user_token: String,
    /// Assertion grant type, always [`GRANT_TYPE_JWT_BEARER`]
    pub grant_type: &'static str,
    /// Identity the assertion is made on behalf of, when one was derived
    pub principal: Option<String>,
}

impl OboAssertion {
    /// Build an assertion for the given user token and principal.
    #[must_use]
    pub fn new(user_token: impl Into<String>, principal: Option<&str>) -> Self {
        Self {
            user_token: user_token.into(),
            grant_type: GRANT_TYPE_JWT_BEARER,
            principal: principal.map(str::to_string),
        }
    }
}

/// A token issued by the authority.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    /// The downstream bearer token
    pub access_token: String,
    /// Absolute expiry reported by the authority
    pub expires_on: DateTime<Utc>,
}

/// The external OAuth2 endpoint that performs the on-behalf-of exchange.
#[async_trait]
pub trait TokenAuthority: Send + Sync {
    /// Exchange a user assertion for a downstream token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ExchangeError::Authority`] when the call
    /// fails; [`crate::error::ExchangeError::CredentialUnavailable`]
    /// when the supplied credential cannot be used for signing.
    async fn acquire_token(
        &self,
        authority_url: &str,
        resource_id: &str,
        credential: &ClientCredential,
        assertion: &OboAssertion,
    ) -> ExchangeResult<TokenResponse>;
}
