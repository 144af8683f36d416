// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token issuance and validation.
//!
//! Access tokens and refresh tokens are both HS256 JWTs, signed with
//! different keys. The current refresh token of each member is kept in an
//! in-memory store; renewal only succeeds for an exact match.

use crate::config::Config;
use crate::error::AppError;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (member id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Access/refresh token pair handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, validates and renews session tokens.
pub struct SessionTokenManager {
    access_key: Vec<u8>,
    refresh_key: Vec<u8>,
    access_ttl_secs: u64,
    refresh_ttl_secs: u64,
    /// member id -> current refresh token
    refresh_tokens: DashMap<i64, String>,
}

impl SessionTokenManager {
    pub fn new(config: &Config) -> Self {
        Self {
            access_key: config.access_token_key.clone(),
            refresh_key: config.refresh_token_key.clone(),
            access_ttl_secs: config.access_token_ttl_secs,
            refresh_ttl_secs: config.refresh_token_ttl_secs,
            refresh_tokens: DashMap::new(),
        }
    }

    /// Issue a fresh token pair, replacing any stored refresh token.
    pub fn issue(&self, member_id: i64) -> Result<SessionTokens, AppError> {
        let access_token = create_jwt(member_id, &self.access_key, self.access_ttl_secs)?;
        let refresh_token = create_jwt(member_id, &self.refresh_key, self.refresh_ttl_secs)?;

        self.refresh_tokens.insert(member_id, refresh_token.clone());

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Issue a new access token for a stored refresh token.
    pub fn renew(&self, refresh_token: &str) -> Result<String, AppError> {
        let member_id = decode_jwt(refresh_token, &self.refresh_key)?;

        let stored = self
            .refresh_tokens
            .get(&member_id)
            .map(|entry| entry.value().clone())
            .ok_or(AppError::NoSuchToken)?;

        if !bool::from(stored.as_bytes().ct_eq(refresh_token.as_bytes())) {
            tracing::warn!(member_id, "Refresh token does not match the stored token");
            return Err(AppError::InvalidToken);
        }

        create_jwt(member_id, &self.access_key, self.access_ttl_secs)
    }

    /// Member id of a valid access token.
    pub fn decode_access(&self, access_token: &str) -> Result<i64, AppError> {
        decode_jwt(access_token, &self.access_key)
    }

    /// Forget the member's refresh token.
    pub fn revoke(&self, member_id: i64) {
        self.refresh_tokens.remove(&member_id);
    }
}

fn create_jwt(member_id: i64, signing_key: &[u8], ttl_secs: u64) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_secs() as usize;

    let claims = Claims {
        sub: member_id.to_string(),
        iat: now,
        exp: now + ttl_secs as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))
}

fn decode_jwt(token: &str, key: &[u8]) -> Result<i64, AppError> {
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(key), &validation)
        .map_err(|_| AppError::InvalidToken)?;

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionTokenManager {
        SessionTokenManager::new(&Config::test_default())
    }

    #[test]
    fn test_issue_then_decode_access() {
        let tokens = manager();
        let pair = tokens.issue(42).unwrap();
        assert_eq!(tokens.decode_access(&pair.access_token).unwrap(), 42);
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let tokens = manager();
        let pair = tokens.issue(42).unwrap();
        assert!(matches!(
            tokens.decode_access(&pair.refresh_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_renew_requires_stored_token() {
        let tokens = manager();
        let pair = tokens.issue(7).unwrap();

        let access = tokens.renew(&pair.refresh_token).unwrap();
        assert_eq!(tokens.decode_access(&access).unwrap(), 7);

        tokens.revoke(7);
        assert!(matches!(
            tokens.renew(&pair.refresh_token),
            Err(AppError::NoSuchToken)
        ));
    }

    #[test]
    fn test_renew_rejects_superseded_token() {
        let tokens = manager();
        tokens.issue(7).unwrap();

        // Validly signed for the same member, but not the token on record.
        let other = create_jwt(7, &tokens.refresh_key, 60).unwrap();
        assert!(matches!(tokens.renew(&other), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_renew_rejects_garbage() {
        let tokens = manager();
        assert!(matches!(
            tokens.renew("not.a.token"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let tokens = manager();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        let claims = Claims {
            sub: "1".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&tokens.access_key),
        )
        .unwrap();

        assert!(matches!(
            tokens.decode_access(&token),
            Err(AppError::InvalidToken)
        ));
    }
}
