// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client.
//!
//! Builds the consent URL and exchanges authorization codes at Google's
//! token endpoint. The member profile is read from the `id_token` returned
//! alongside the tokens; it came straight from Google over TLS, so its
//! signature is not re-verified here.

use crate::error::AppError;
use crate::services::oauth::{OAuthClient, OAuthMember};
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::Deserialize;

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar.readonly";

/// Google OAuth client.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_endpoint: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl OAuthClient for GoogleOAuthClient {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             access_type=offline&\
             prompt=consent&\
             state={}",
            AUTHORIZATION_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(SCOPES),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthMember, AppError> {
        let response = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AuthenticationFailed(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Google token exchange failed");
            return Err(AppError::AuthenticationFailed(format!(
                "Token exchange failed with status {}",
                status
            )));
        }

        let tokens: GoogleTokenResponse = response.json().await.map_err(|e| {
            AppError::AuthenticationFailed(format!("Failed to parse token response: {}", e))
        })?;

        let refresh_token = tokens.refresh_token.ok_or_else(|| {
            AppError::AuthenticationFailed("Google did not return a refresh token".to_string())
        })?;

        let profile = decode_id_token_profile(&tokens.id_token)?;

        tracing::info!(email = %profile.email, "Google code exchange succeeded");

        Ok(OAuthMember {
            display_name: profile.name.unwrap_or_else(|| profile.email.clone()),
            email: profile.email,
            profile_image_url: profile.picture,
            refresh_token,
        })
    }
}

/// Token response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    id_token: String,
    /// Only present when consent was granted with `access_type=offline`
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Profile claims carried in the `id_token` payload.
#[derive(Debug, Deserialize)]
struct IdTokenProfile {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

fn decode_id_token_profile(id_token: &str) -> Result<IdTokenProfile, AppError> {
    let payload = id_token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::AuthenticationFailed("Malformed id_token".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AppError::AuthenticationFailed(format!("Bad id_token encoding: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::AuthenticationFailed(format!("Bad id_token payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_id_token(payload: &serde_json::Value) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string())
        )
    }

    #[test]
    fn test_authorization_url_requests_offline_access() {
        let client = GoogleOAuthClient::new("client-123".to_string(), "secret".to_string());
        let url = client.authorization_url("http://localhost:3000/callback", "abc");

        assert!(url.starts_with(AUTHORIZATION_ENDPOINT));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("calendar.readonly"));
        assert!(url.contains("state=abc"));
    }

    #[test]
    fn test_decode_id_token_profile() {
        let token = fake_id_token(&serde_json::json!({
            "email": "a@x.com",
            "name": "A",
            "picture": "https://img/a.png"
        }));

        let profile = decode_id_token_profile(&token).unwrap();
        assert_eq!(profile.email, "a@x.com");
        assert_eq!(profile.name.as_deref(), Some("A"));
        assert_eq!(profile.picture.as_deref(), Some("https://img/a.png"));
    }

    #[test]
    fn test_decode_id_token_without_email_fails() {
        let token = fake_id_token(&serde_json::json!({ "name": "A" }));
        assert!(matches!(
            decode_id_token_profile(&token),
            Err(AppError::AuthenticationFailed(_))
        ));
        assert!(decode_id_token_profile("not-a-jwt").is_err());
    }
}
