//! Exchange error types using thiserror 2.0.
//!
//! Validation failures are surfaced before any exchange is attempted;
//! exchange failures carry the original cause. Retry policy belongs to
//! the caller, never to this layer.

use thiserror::Error;

/// Errors produced while resolving an on-behalf-of token.
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The inbound user token failed pre-exchange validation
    #[error("invalid user token: {reason}")]
    InvalidToken {
        /// Why the token was rejected
        reason: String,
    },

    /// The inbound token could not be parsed for claim extraction.
    /// Distinct from a claim simply being absent.
    #[error("token claims could not be parsed: {reason}")]
    MalformedClaims {
        /// Parser failure description
        reason: String,
    },

    /// The client certificate credential could not be located or used
    #[error("credential {identifier} unavailable: {reason}")]
    CredentialUnavailable {
        /// Thumbprint or client id the lookup was performed with
        identifier: String,
        /// Why the credential could not be provided
        reason: String,
    },

    /// The token-issuing authority call failed or was cancelled
    #[error("authority request failed: {reason}")]
    Authority {
        /// Failure description from the authority call
        reason: String,
    },
}

/// Result type for exchange operations.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

impl ExchangeError {
    /// Create an invalid token error.
    #[must_use]
    pub fn invalid_token(reason: impl Into<String>) -> Self {
        Self::InvalidToken {
            reason: reason.into(),
        }
    }

    /// Create a malformed claims error.
    #[must_use]
    pub fn malformed_claims(reason: impl Into<String>) -> Self {
        Self::MalformedClaims {
            reason: reason.into(),
        }
    }

    /// Create a credential unavailable error.
    #[must_use]
    pub fn credential_unavailable(
        identifier: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::CredentialUnavailable {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    /// Create an authority error.
    #[must_use]
    pub fn authority(reason: impl Into<String>) -> Self {
        Self::Authority {
            reason: reason.into(),
        }
    }

    /// Check if the caller may reasonably retry the operation.
    ///
    /// Only authority failures are transient; a rejected token or a
    /// missing credential will not heal on its own.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Authority { .. })
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::authority("token endpoint request timed out")
        } else if err.is_connect() {
            Self::authority(format!("token endpoint unreachable: {err}"))
        } else {
            Self::authority(err.to_string())
        }
    }
}
