// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local development.

use std::env;

const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 60 * 60;
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 14 * 24 * 60 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Google OAuth client ID (public)
    pub google_client_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// SQLite connection URL
    pub database_url: String,
    /// Server port
    pub port: u16,
    /// Lifetime of session access tokens
    pub access_token_ttl_secs: u64,
    /// Lifetime of session refresh tokens
    pub refresh_token_ttl_secs: u64,

    // --- Secrets ---
    /// Google OAuth client secret
    pub google_client_secret: String,
    /// HS256 key for session access tokens (raw bytes)
    pub access_token_key: Vec<u8>,
    /// HS256 key for session refresh tokens (raw bytes)
    pub refresh_token_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            google_client_id: "test_client_id".to_string(),
            frontend_url: "http://localhost:3000".to_string(),
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            google_client_secret: "test_secret".to_string(),
            access_token_key: b"test_access_key_32_bytes_minimum!".to_vec(),
            refresh_token_key: b"test_refresh_key_32_bytes_minimum".to_vec(),
            oauth_state_key: b"test_oauth_state_key_32_bytes!!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:calshare.db".to_string()),
            port: parse_or("PORT", 8080)?,
            access_token_ttl_secs: parse_or("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)?,
            refresh_token_ttl_secs: parse_or(
                "REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,

            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            access_token_key: required("ACCESS_TOKEN_KEY")?.into_bytes(),
            refresh_token_key: required("REFRESH_TOKEN_KEY")?.into_bytes(),
            oauth_state_key: required("OAUTH_STATE_KEY")?.into_bytes(),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("GOOGLE_CLIENT_ID", "test_id");
        env::set_var("GOOGLE_CLIENT_SECRET", " test_secret\n");
        env::set_var("ACCESS_TOKEN_KEY", "test_access_key_32_bytes_minimum!");
        env::set_var("REFRESH_TOKEN_KEY", "test_refresh_key_32_bytes_minimum");
        env::set_var("OAUTH_STATE_KEY", "test_state_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.google_client_id, "test_id");
        assert_eq!(config.google_client_secret, "test_secret");
        assert_eq!(config.access_token_ttl_secs, DEFAULT_ACCESS_TOKEN_TTL_SECS);
        assert_eq!(config.refresh_token_ttl_secs, DEFAULT_REFRESH_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("CALSHARE_TEST_BAD_PORT", "eighty");
        let result: Result<u16, _> = parse_or("CALSHARE_TEST_BAD_PORT", 8080);
        assert!(matches!(result, Err(ConfigError::Invalid("CALSHARE_TEST_BAD_PORT"))));
    }
}
