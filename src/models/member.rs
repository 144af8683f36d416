// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member model for storage and API.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Member identity stored in the `members` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    /// Email reported by the OAuth provider (unique)
    pub email: String,
    pub display_name: String,
    /// Profile picture URL, if the provider shared one
    pub profile_image_url: Option<String>,
    /// When the member first logged in
    pub created_at: String,
}

/// Public view of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            email: member.email,
            display_name: member.display_name,
            profile_image_url: member.profile_image_url,
        }
    }
}
