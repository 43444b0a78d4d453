//! Inbound user token validation.

use std::collections::HashSet;

use tracing::error;

use crate::error::{ExchangeError, ExchangeResult};
use crate::jwt::claims::Claims;

/// Validates inbound bearer tokens against audience and expiry.
///
/// Pure over its inputs: every outcome is a return value, never a panic
/// or a side effect.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    accepted_audiences: HashSet<String>,
}

impl TokenValidator {
    /// Create a validator accepting tokens issued for the given audiences.
    #[must_use]
    pub fn new(accepted_audiences: HashSet<String>) -> Self {
        Self { accepted_audiences }
    }

    /// Validate a raw user token and return its decoded claims.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::InvalidToken`] when the token is
    /// empty/whitespace, expired, or issued for an unaccepted audience;
    /// [`ExchangeError::MalformedClaims`] when it cannot be parsed.
    pub fn validate(&self, token: &str) -> ExchangeResult<Claims> {
        if token.trim().is_empty() {
            error!("received user token is null or empty");
            return Err(ExchangeError::invalid_token("user token is empty"));
        }

        let claims = Claims::decode(token)?;

        if claims.is_expired() {
            error!(exp = ?claims.exp, "received user token is expired");
            return Err(ExchangeError::invalid_token("user token is expired"));
        }

        if !claims.audience_matches(&self.accepted_audiences) {
            error!(aud = ?claims.claim("aud"), "received user token audience is not accepted");
            return Err(ExchangeError::invalid_token(format!(
                "token audience {:?} is not accepted",
                claims.claim("aud")
            )));
        }

        Ok(claims)
    }

    /// Extract a single claim value from a raw token.
    ///
    /// Returns `Ok(None)` when the token or claim name is empty, or the
    /// claim is absent. A token that cannot be parsed is a distinguished
    /// failure, so callers can tell "claim absent" from "token unparsable".
    pub fn extract_claim(token: &str, claim_name: &str) -> ExchangeResult<Option<String>> {
        if token.trim().is_empty() || claim_name.trim().is_empty() {
            return Ok(None);
        }
        Ok(Claims::decode(token)?.claim(claim_name))
    }
}
