//! On-behalf-of token exchange and caching for federated search providers.
//!
//! A federated search provider receives a user's bearer token from the
//! host chat platform and needs a token of its own to call the
//! downstream search API on that user's behalf. This crate validates
//! the inbound token, derives a per-user cache identity from its
//! claims, and exchanges it against an external OAuth2 authority using
//! a client certificate credential, caching results until they near
//! expiry.
//!
//! The activity protocol, card rendering, and search client around this
//! core are external callers; the certificate store and the authority
//! endpoint are injected behind [`credentials::CredentialProvider`] and
//! [`authority::TokenAuthority`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authority;
pub mod cancel;
pub mod config;
pub mod credentials;
pub mod error;
pub mod exchange;
pub mod jwt;

pub use authority::{HttpTokenAuthority, OboAssertion, TokenAuthority, TokenResponse};
pub use cancel::{CancelHandle, CancelSignal};
pub use config::ExchangeConfig;
pub use credentials::{ClientCredential, CredentialProvider, PemDirCredentialProvider};
pub use error::{ExchangeError, ExchangeResult};
pub use exchange::OboTokenResolver;
pub use jwt::{Claims, TokenValidator};
