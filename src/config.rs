//! Exchange configuration.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the on-behalf-of token resolver.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Application (client) id the exchange is performed as
    pub client_id: String,
    /// Thumbprint identifying the client certificate credential
    pub cert_thumbprint: String,
    /// Directory the PEM credential store looks certificates up in
    pub credential_dir: PathBuf,
    /// Audiences an inbound user token is accepted for
    pub accepted_audiences: HashSet<String>,
    /// Request timeout for authority calls
    pub http_timeout: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        let accepted_audiences = std::env::var("OBO_ACCEPTED_AUDIENCES")
            .map(|raw| {
                raw.split(',')
                    .map(|aud| aud.trim().to_string())
                    .filter(|aud| !aud.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            client_id: std::env::var("OBO_CLIENT_ID").unwrap_or_default(),
            cert_thumbprint: std::env::var("OBO_CERT_THUMBPRINT").unwrap_or_default(),
            credential_dir: std::env::var("OBO_CREDENTIAL_DIR")
                .unwrap_or_else(|_| "/var/run/secrets/obo".to_string())
                .into(),
            accepted_audiences,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl ExchangeConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(client_id: impl Into<String>, cert_thumbprint: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            cert_thumbprint: cert_thumbprint.into(),
            ..Default::default()
        }
    }

    /// Set the credential store directory.
    #[must_use]
    pub fn with_credential_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credential_dir = dir.into();
        self
    }

    /// Set the accepted audiences.
    #[must_use]
    pub fn with_accepted_audiences<I, S>(mut self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_audiences = audiences.into_iter().map(Into::into).collect();
        self
    }

    /// Set the authority request timeout.
    #[must_use]
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}
