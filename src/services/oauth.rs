// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth provider seam.

use crate::error::AppError;
use async_trait::async_trait;

/// Profile and credentials returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthMember {
    pub email: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    /// Provider refresh token, persisted per member
    pub refresh_token: String,
}

/// External OAuth provider.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// Consent page URL the browser is sent to.
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange an authorization code for the member's profile and tokens.
    ///
    /// Every failure is reported as [`AppError::AuthenticationFailed`].
    async fn exchange_code(&self, code: &str, redirect_uri: &str)
        -> Result<OAuthMember, AppError>;
}
