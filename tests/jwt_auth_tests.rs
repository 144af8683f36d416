// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT compatibility tests.
//!
//! These tests verify that session tokens use the canonical claims layout,
//! so tokens issued at login decode in the middleware and vice versa.

use calshare::config::Config;
use calshare::services::SessionTokenManager;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Claims structure that clients and the middleware agree on.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

fn decode_claims(token: &str, key: &[u8]) -> Claims {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(key),
        &Validation::new(Algorithm::HS256),
    )
    .expect("Failed to decode JWT - check Claims struct compatibility")
    .claims
}

#[test]
fn test_issued_tokens_use_canonical_claims() {
    let config = Config::test_default();
    let tokens = SessionTokenManager::new(&config);

    let pair = tokens.issue(12345).unwrap();

    let access = decode_claims(&pair.access_token, &config.access_token_key);
    assert_eq!(access.sub, "12345");
    assert!(access.exp > access.iat);

    let refresh = decode_claims(&pair.refresh_token, &config.refresh_token_key);
    assert_eq!(refresh.sub.parse::<i64>().unwrap(), 12345);
}

#[test]
fn test_expirations_follow_configured_lifetimes() {
    let config = Config::test_default();
    let tokens = SessionTokenManager::new(&config);
    let pair = tokens.issue(1).unwrap();

    let access = decode_claims(&pair.access_token, &config.access_token_key);
    let refresh = decode_claims(&pair.refresh_token, &config.refresh_token_key);

    assert_eq!(access.exp - access.iat, config.access_token_ttl_secs as usize);
    assert_eq!(
        refresh.exp - refresh.iat,
        config.refresh_token_ttl_secs as usize
    );
    assert!(refresh.exp > access.exp);
}

#[test]
fn test_externally_encoded_token_is_accepted() {
    let config = Config::test_default();
    let tokens = SessionTokenManager::new(&config);

    let claims = Claims {
        sub: "98765".to_string(),
        exp: now() + 600,
        iat: now(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.access_token_key),
    )
    .unwrap();

    assert_eq!(tokens.decode_access(&token).unwrap(), 98765);
}

#[test]
fn test_non_numeric_subject_is_rejected() {
    let config = Config::test_default();
    let tokens = SessionTokenManager::new(&config);

    let claims = Claims {
        sub: "a@x.com".to_string(),
        exp: now() + 600,
        iat: now(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&config.access_token_key),
    )
    .unwrap();

    assert!(tokens.decode_access(&token).is_err());
}
