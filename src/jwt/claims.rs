//! Decoded JWT payload with uniform claim access.
//!
//! Claims are decoded without key material: the hosting platform has
//! already authenticated the channel, and this component only needs the
//! payload to derive identity and check audience and expiry.

use std::collections::{HashMap, HashSet};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ExchangeError, ExchangeResult};

/// The `aud` claim, which issuers encode as either a single string or
/// an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// Single audience value
    One(String),
    /// Multiple audience values
    Many(Vec<String>),
}

impl Audience {
    /// The first audience value, if any.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        match self {
            Self::One(aud) => Some(aud),
            Self::Many(list) => list.first().map(String::as_str),
        }
    }
}

/// Decoded payload of an inbound user token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Intended recipient(s) of the token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
    /// Expiry as unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// User principal name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upn: Option<String>,
    /// Preferred username, usually an email-shaped value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Remaining claims, untyped
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Decode the payload of a compact JWT without verifying its signature.
    ///
    /// # Errors
    ///
    /// Returns [`ExchangeError::MalformedClaims`] when the token is not a
    /// parsable JWT.
    pub fn decode(token: &str) -> ExchangeResult<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| ExchangeError::malformed_claims(e.to_string()))?;
        Ok(data.claims)
    }

    /// Uniform string view of a claim by name.
    ///
    /// Composite audiences collapse to their first value; non-string
    /// custom claims are rendered as JSON.
    #[must_use]
    pub fn claim(&self, name: &str) -> Option<String> {
        match name {
            "aud" => self.aud.as_ref().and_then(Audience::primary).map(str::to_string),
            "exp" => self.exp.map(|exp| exp.to_string()),
            "upn" => self.upn.clone(),
            "preferred_username" => self.preferred_username.clone(),
            _ => self.custom.get(name).map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        }
    }

    /// Stable identifier for the user the token was issued to.
    ///
    /// Prefers `upn`; falls back to the local part of
    /// `preferred_username` (the text before `@`). Returns `None` when
    /// neither yields a non-blank value.
    #[must_use]
    pub fn user_identity(&self) -> Option<String> {
        if let Some(upn) = self.upn.as_deref() {
            if !upn.trim().is_empty() {
                return Some(upn.to_string());
            }
        }
        self.preferred_username
            .as_deref()
            .and_then(|name| name.split('@').next())
            .filter(|local| !local.trim().is_empty())
            .map(str::to_string)
    }

    /// Whether the token's expiry is in the past. A token with no `exp`
    /// claim is treated as expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp.map_or(true, |exp| exp < now)
    }

    /// Whether any audience value is in the accepted set.
    #[must_use]
    pub fn audience_matches(&self, accepted: &HashSet<String>) -> bool {
        match &self.aud {
            Some(Audience::One(aud)) => accepted.contains(aud),
            Some(Audience::Many(list)) => list.iter().any(|aud| accepted.contains(aud)),
            None => false,
        }
    }
}
