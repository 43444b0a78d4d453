//! Property-based tests for validation, identity derivation, and the
//! cache expiration buffer.

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use proptest::prelude::*;

use obo_exchange::exchange::{CacheKey, CachedCredential, TokenCache};
use obo_exchange::jwt::{Claims, TokenValidator};

fn make_token(payload: serde_json::Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

fn accepted() -> HashSet<String> {
    ["api://search-bot".to_string()].into()
}

proptest! {
    /// Any token whose expiry is in the past is rejected.
    #[test]
    fn prop_expired_tokens_are_always_invalid(age_secs in 1i64..100_000_000) {
        let token = make_token(serde_json::json!({
            "aud": "api://search-bot",
            "exp": Utc::now().timestamp() - age_secs,
        }));
        let validator = TokenValidator::new(accepted());
        prop_assert!(validator.validate(&token).is_err());
    }

    /// Any token with an unaccepted audience is rejected.
    #[test]
    fn prop_unaccepted_audiences_are_always_invalid(aud in "[a-z0-9:/.-]{1,40}") {
        prop_assume!(aud != "api://search-bot");
        let token = make_token(serde_json::json!({
            "aud": aud,
            "exp": Utc::now().timestamp() + 600,
        }));
        let validator = TokenValidator::new(accepted());
        prop_assert!(validator.validate(&token).is_err());
    }

    /// The cache never serves an entry within the expiration buffer.
    /// Offsets near the boundary are skipped to keep the test immune to
    /// clock movement between insert and read.
    #[test]
    fn prop_cache_honours_expiration_buffer(offset_secs in -600i64..600) {
        let cache = TokenCache::new();
        let key = CacheKey::new("resource", "alice");
        cache.insert(
            key.clone(),
            CachedCredential::new(
                "T1",
                "resource",
                Utc::now() + chrono::Duration::seconds(offset_secs),
            ),
        );

        if offset_secs >= 35 {
            prop_assert!(cache.get_fresh(&key).is_some());
        } else if offset_secs <= 28 {
            prop_assert!(cache.get_fresh(&key).is_none());
        }
    }

    /// Identity derivation never panics and always takes the local part
    /// of preferred_username when no upn is present.
    #[test]
    fn prop_preferred_username_local_part(local in "[a-z][a-z0-9]{0,11}", domain in "[a-z]{1,8}\\.com") {
        let token = make_token(serde_json::json!({
            "preferred_username": format!("{local}@{domain}"),
        }));
        let claims = Claims::decode(&token).unwrap();
        let identity = claims.user_identity();
        prop_assert_eq!(identity.as_deref(), Some(local.as_str()));
    }

    /// A upn claim always wins over preferred_username.
    #[test]
    fn prop_upn_takes_precedence(upn in "[a-z]{1,10}@[a-z]{1,8}\\.com", other in "[a-z]{1,10}@[a-z]{1,8}\\.com") {
        let token = make_token(serde_json::json!({
            "upn": upn,
            "preferred_username": other,
        }));
        let claims = Claims::decode(&token).unwrap();
        let identity = claims.user_identity();
        prop_assert_eq!(identity.as_deref(), Some(upn.as_str()));
    }

    /// Claim extraction on arbitrary parsable tokens never fails for
    /// absent claims, it just returns nothing.
    #[test]
    fn prop_absent_claims_extract_to_none(name in "[a-z_]{1,16}") {
        prop_assume!(!matches!(name.as_str(), "aud" | "exp" | "upn" | "preferred_username"));
        let token = make_token(serde_json::json!({ "exp": 0 }));
        prop_assert!(TokenValidator::extract_claim(&token, &name).unwrap().is_none());
    }
}
