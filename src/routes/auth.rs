// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth login and session token routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::Result;
use crate::services::SessionTokens;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/google/oauth-uri", get(oauth_uri))
        .route("/api/auth/google/token", post(exchange_token))
        .route("/api/auth/token/access", post(renew_access_token))
}

/// Query parameters for building the consent URL.
#[derive(Deserialize, Validate)]
pub struct OAuthUriParams {
    /// Where Google sends the browser back to with the code.
    #[validate(url)]
    redirect_uri: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OAuthUriResponse {
    pub oauth_uri: String,
}

async fn oauth_uri(
    State(state): State<Arc<AppState>>,
    Query(params): Query<OAuthUriParams>,
) -> Result<Json<OAuthUriResponse>> {
    params.validate()?;

    let oauth_uri = state
        .auth_service
        .generate_login_redirect(&params.redirect_uri)?;

    tracing::info!(redirect_uri = %params.redirect_uri, "Issued Google consent URL");

    Ok(Json(OAuthUriResponse { oauth_uri }))
}

#[derive(Deserialize, Validate)]
pub struct TokenExchangeRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    code: String,
    #[validate(url)]
    redirect_uri: String,
    /// Signed state from the consent URL, if the client kept it
    #[serde(default)]
    state: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<SessionTokens> for TokenResponse {
    fn from(tokens: SessionTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Exchange a Google authorization code for a session.
async fn exchange_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TokenExchangeRequest>,
) -> Result<Json<TokenResponse>> {
    body.validate()?;

    let tokens = state
        .auth_service
        .exchange_code_for_session(&body.code, &body.redirect_uri, body.state.as_deref())
        .await?;

    Ok(Json(tokens.into()))
}

#[derive(Deserialize, Validate)]
pub struct AccessTokenRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    refresh_token: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

async fn renew_access_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AccessTokenRequest>,
) -> Result<Json<AccessTokenResponse>> {
    body.validate()?;

    let access_token = state.auth_service.renew_access_token(&body.refresh_token)?;

    Ok(Json(AccessTokenResponse { access_token }))
}
