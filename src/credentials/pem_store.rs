//! Certificate store backed by a directory of PEM files.
//!
//! The platform equivalent is an OS certificate store keyed by
//! thumbprint; here each credential is a `<dir>/<thumbprint>.pem`
//! bundle holding the certificate and its private key.

use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::debug;

use crate::credentials::{ClientCredential, CredentialProvider};
use crate::error::{ExchangeError, ExchangeResult};

/// Credential provider reading PEM bundles from a directory.
#[derive(Debug, Clone)]
pub struct PemDirCredentialProvider {
    dir: PathBuf,
    client_id: String,
}

impl PemDirCredentialProvider {
    /// Create a provider over the given directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, client_id: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            client_id: client_id.into(),
        }
    }

    fn parse_bundle(&self, identifier: &str, pem_text: &str) -> ExchangeResult<ClientCredential> {
        let mut reader = std::io::Cursor::new(pem_text.as_bytes());
        let mut certificate_der: Option<Vec<u8>> = None;
        let mut has_key = false;

        for item in rustls_pemfile::read_all(&mut reader) {
            let item = item.map_err(|e| {
                ExchangeError::credential_unavailable(identifier, format!("unreadable PEM: {e}"))
            })?;
            match item {
                rustls_pemfile::Item::X509Certificate(der) => {
                    if certificate_der.is_none() {
                        certificate_der = Some(der.as_ref().to_vec());
                    }
                }
                rustls_pemfile::Item::Pkcs1Key(_)
                | rustls_pemfile::Item::Pkcs8Key(_)
                | rustls_pemfile::Item::Sec1Key(_) => has_key = true,
                _ => {}
            }
        }

        let certificate_der = certificate_der.ok_or_else(|| {
            ExchangeError::credential_unavailable(identifier, "bundle contains no certificate")
        })?;
        if !has_key {
            return Err(ExchangeError::credential_unavailable(
                identifier,
                "bundle contains no private key",
            ));
        }

        Ok(ClientCredential {
            client_id: self.client_id.clone(),
            certificate_der,
            private_key_pem: SecretString::from(pem_text.to_string()),
        })
    }
}

#[async_trait]
impl CredentialProvider for PemDirCredentialProvider {
    async fn get_credential(&self, identifier: &str) -> ExchangeResult<ClientCredential> {
        if identifier.trim().is_empty() {
            return Err(ExchangeError::credential_unavailable(
                identifier,
                "no thumbprint configured",
            ));
        }

        let path = self.dir.join(format!("{identifier}.pem"));
        debug!(path = %path.display(), "loading client credential bundle");

        let pem_text = tokio::fs::read_to_string(&path).await.map_err(|e| {
            ExchangeError::credential_unavailable(
                identifier,
                format!("cannot read {}: {e}", path.display()),
            )
        })?;

        self.parse_bundle(identifier, &pem_text)
    }
}
