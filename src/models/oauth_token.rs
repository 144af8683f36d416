// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth provider token model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The provider refresh token kept for a member (at most one per member).
///
/// Overwritten on every login.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OAuthToken {
    pub id: i64,
    pub member_id: i64,
    pub refresh_token: String,
    pub updated_at: String,
}
