// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication: OAuth login, member onboarding and session tokens.

use crate::db::{categories, members, oauth_tokens, subscriptions, Db};
use crate::error::AppError;
use crate::models::{CategoryType, Member, PERSONAL_CATEGORY_NAME};
use crate::services::color::ColorPicker;
use crate::services::oauth::{OAuthClient, OAuthMember};
use crate::services::token::{SessionTokenManager, SessionTokens};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// How long a signed OAuth `state` stays acceptable.
const STATE_MAX_AGE_MS: u128 = 10 * 60 * 1000;

/// Attempts at onboarding before giving up on a contended email.
const MAX_ONBOARDING_ATTEMPTS: usize = 3;

pub struct AuthService {
    db: Db,
    oauth: Arc<dyn OAuthClient>,
    colors: Arc<dyn ColorPicker>,
    tokens: Arc<SessionTokenManager>,
    state_key: Vec<u8>,
}

impl AuthService {
    pub fn new(
        db: Db,
        oauth: Arc<dyn OAuthClient>,
        colors: Arc<dyn ColorPicker>,
        tokens: Arc<SessionTokenManager>,
        state_key: Vec<u8>,
    ) -> Self {
        Self {
            db,
            oauth,
            colors,
            tokens,
            state_key,
        }
    }

    /// Provider consent URL for `redirect_uri`, with a signed `state`.
    pub fn generate_login_redirect(&self, redirect_uri: &str) -> Result<String, AppError> {
        let state = sign_state(redirect_uri, now_millis()?, &self.state_key)?;
        Ok(self.oauth.authorization_url(redirect_uri, &state))
    }

    /// Exchange an authorization code, onboard the member if needed and
    /// issue a session.
    pub async fn exchange_code_for_session(
        &self,
        code: &str,
        redirect_uri: &str,
        state: Option<&str>,
    ) -> Result<SessionTokens, AppError> {
        if let Some(state) = state {
            self.check_state(state, redirect_uri)?;
        }

        let profile = self.oauth.exchange_code(code, redirect_uri).await?;
        let member = self.onboard(&profile).await?;

        tracing::info!(member_id = member.id, "Session issued");

        self.tokens.issue(member.id)
    }

    /// New access token for a refresh token previously issued to the member.
    pub fn renew_access_token(&self, refresh_token: &str) -> Result<String, AppError> {
        self.tokens.renew(refresh_token)
    }

    /// Member id behind an access token.
    pub async fn resolve_member(&self, access_token: &str) -> Result<i64, AppError> {
        let member_id = self.tokens.decode_access(access_token)?;

        if !members::exists_by_id(self.db.pool(), member_id).await? {
            return Err(AppError::NotFound(format!("member {}", member_id)));
        }

        Ok(member_id)
    }

    /// Find or create the member, then store the provider refresh token.
    ///
    /// A new member gets the PERSONAL category and a subscription to it in
    /// the same transaction. If a concurrent login wins the write first, the
    /// transaction is rolled back and the lookup retried.
    async fn onboard(&self, profile: &OAuthMember) -> Result<Member, AppError> {
        for attempt in 1..=MAX_ONBOARDING_ATTEMPTS {
            let mut tx = self.db.begin_immediate().await?;

            let member = match members::find_by_email(&mut *tx, &profile.email).await? {
                Some(member) => member,
                None => {
                    let inserted = members::insert(
                        &mut *tx,
                        &profile.email,
                        &profile.display_name,
                        profile.profile_image_url.as_deref(),
                    )
                    .await?;

                    let Some(member) = inserted else {
                        tracing::info!(attempt, "Member created concurrently, retrying lookup");
                        continue;
                    };

                    let category = categories::insert(
                        &mut *tx,
                        member.id,
                        PERSONAL_CATEGORY_NAME,
                        CategoryType::Personal,
                    )
                    .await?;
                    subscriptions::insert(&mut *tx, member.id, category.id, self.colors.pick())
                        .await?;

                    tracing::info!(member_id = member.id, "New member onboarded");
                    member
                }
            };

            oauth_tokens::upsert(&mut *tx, member.id, &profile.refresh_token).await?;
            tx.commit().await?;

            return Ok(member);
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "Onboarding did not settle after {} attempts",
            MAX_ONBOARDING_ATTEMPTS
        )))
    }

    fn check_state(&self, state: &str, redirect_uri: &str) -> Result<(), AppError> {
        let (signed_uri, issued_at) = verify_state(state, &self.state_key).ok_or_else(|| {
            AppError::AuthenticationFailed("Invalid OAuth state".to_string())
        })?;

        if now_millis()?.saturating_sub(issued_at) > STATE_MAX_AGE_MS {
            return Err(AppError::AuthenticationFailed(
                "OAuth state expired".to_string(),
            ));
        }

        if signed_uri != redirect_uri {
            return Err(AppError::AuthenticationFailed(
                "OAuth state was issued for another redirect URI".to_string(),
            ));
        }

        Ok(())
    }
}

fn now_millis() -> Result<u128, AppError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis())
}

/// Encode `redirect_uri|timestamp_hex|signature_hex` as base64url.
fn sign_state(redirect_uri: &str, issued_at_ms: u128, key: &[u8]) -> Result<String, AppError> {
    let payload = format!("{}|{:x}", redirect_uri, issued_at_ms);

    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed.as_bytes()))
}

/// Verify a state produced by [`sign_state`], returning the redirect URI and
/// issue time.
fn verify_state(state: &str, key: &[u8]) -> Option<(String, u128)> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Split from the right: the redirect URI may itself contain '|'.
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let redirect_uri = parts.next()?;

    let signature = hex::decode(signature_hex).ok()?;
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(format!("{}|{}", redirect_uri, timestamp_hex).as_bytes());

    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    let issued_at = u128::from_str_radix(timestamp_hex, 16).ok()?;
    Some((redirect_uri.to_string(), issued_at))
}
