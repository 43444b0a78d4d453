//! Client credential provisioning.
//!
//! The exchange signs its authority requests with a client certificate.
//! Where that certificate lives is a deployment concern, so retrieval
//! sits behind a capability trait with a single operation.

pub mod pem_store;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::ExchangeResult;

pub use pem_store::PemDirCredentialProvider;

/// A client certificate credential usable for signing an OBO request.
#[derive(Debug, Clone)]
pub struct ClientCredential {
    /// Application (client) id the credential belongs to
    pub client_id: String,
    /// DER-encoded certificate, used for the assertion thumbprint header
    pub certificate_der: Vec<u8>,
    /// PEM text containing the private key
    pub private_key_pem: SecretString,
}

/// Provides the client certificate credential for the exchange.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Look up a credential by identifier (typically a thumbprint).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ExchangeError::CredentialUnavailable`]
    /// when the credential cannot be located or parsed.
    async fn get_credential(&self, identifier: &str) -> ExchangeResult<ClientCredential>;
}
