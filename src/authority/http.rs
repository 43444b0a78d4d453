//! HTTP client for the authority's OAuth2 token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::authority::{OboAssertion, TokenAuthority, TokenResponse, CLIENT_ASSERTION_TYPE_JWT_BEARER};
use crate::credentials::ClientCredential;
use crate::error::{ExchangeError, ExchangeResult};

/// Lifetime of a signed client assertion.
const CLIENT_ASSERTION_TTL_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    /// Absent means the authority gave no lifetime; the token is then
    /// treated as immediately stale and never served from cache.
    #[serde(default)]
    expires_in: u64,
}

/// Token authority client POSTing OBO exchanges to
/// `{authority_url}/oauth2/token`, authenticating with a
/// certificate-signed client assertion.
pub struct HttpTokenAuthority {
    http: reqwest::Client,
    assertion_alg: Algorithm,
}

impl HttpTokenAuthority {
    /// Create a new authority client.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::Authority`] when the HTTP client cannot
    /// be constructed.
    pub fn new(timeout: Duration) -> ExchangeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExchangeError::authority(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            assertion_alg: Algorithm::RS256,
        })
    }

    /// Set the algorithm used to sign client assertions.
    #[must_use]
    pub fn with_assertion_algorithm(mut self, alg: Algorithm) -> Self {
        self.assertion_alg = alg;
        self
    }

    /// Build and sign the client assertion proving possession of the
    /// certificate credential.
    fn client_assertion(
        &self,
        credential: &ClientCredential,
        token_endpoint: &str,
    ) -> ExchangeResult<String> {
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({
            "iss": credential.client_id,
            "sub": credential.client_id,
            "aud": token_endpoint,
            "jti": Uuid::new_v4().to_string(),
            "iat": now,
            "exp": now + CLIENT_ASSERTION_TTL_SECS,
        });

        let mut header = Header::new(self.assertion_alg);
        header.x5t_s256 = Some(URL_SAFE_NO_PAD.encode(Sha256::digest(&credential.certificate_der)));

        let pem = credential.private_key_pem.expose_secret().as_bytes();
        let key = match self.assertion_alg {
            Algorithm::RS256 | Algorithm::RS384 | Algorithm::RS512 => {
                EncodingKey::from_rsa_pem(pem)
            }
            Algorithm::ES256 | Algorithm::ES384 => EncodingKey::from_ec_pem(pem),
            other => {
                return Err(ExchangeError::credential_unavailable(
                    &credential.client_id,
                    format!("unsupported assertion algorithm {other:?}"),
                ))
            }
        }
        .map_err(|e| {
            ExchangeError::credential_unavailable(
                &credential.client_id,
                format!("private key rejected: {e}"),
            )
        })?;

        jsonwebtoken::encode(&header, &claims, &key).map_err(|e| {
            ExchangeError::credential_unavailable(
                &credential.client_id,
                format!("failed to sign client assertion: {e}"),
            )
        })
    }
}

#[async_trait]
impl TokenAuthority for HttpTokenAuthority {
    #[instrument(skip(self, credential, assertion), fields(resource = %resource_id))]
    async fn acquire_token(
        &self,
        authority_url: &str,
        resource_id: &str,
        credential: &ClientCredential,
        assertion: &OboAssertion,
    ) -> ExchangeResult<TokenResponse> {
        let endpoint = format!("{}/oauth2/token", authority_url.trim_end_matches('/'));
        let client_assertion = self.client_assertion(credential, &endpoint)?;

        let form = [
            ("grant_type", assertion.grant_type),
            ("assertion", assertion.user_token.as_str()),
            ("client_id", credential.client_id.as_str()),
            ("client_assertion_type", CLIENT_ASSERTION_TYPE_JWT_BEARER),
            ("client_assertion", client_assertion.as_str()),
            ("resource", resource_id),
            ("requested_token_use", "on_behalf_of"),
        ];

        debug!(endpoint = %endpoint, "requesting on-behalf-of token");
        let response = self.http.post(&endpoint).form(&form).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::authority(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let decoded: TokenEndpointResponse = response.json().await.map_err(|e| {
            ExchangeError::authority(format!("failed to decode token response: {e}"))
        })?;

        // expires_in is authority-supplied input; saturate instead of
        // wrapping an oversized value into the past
        let lifetime = i64::try_from(decoded.expires_in).unwrap_or(i64::MAX);
        let expires_on = chrono::Duration::try_seconds(lifetime)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(chrono::DateTime::<Utc>::MAX_UTC);
        info!(expires_on = %expires_on, "on-behalf-of token issued");

        Ok(TokenResponse {
            access_token: decoded.access_token,
            expires_on,
        })
    }
}
