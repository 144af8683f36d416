// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member profile and account deletion.

use crate::db::{members, oauth_tokens, subscriptions, Db};
use crate::error::AppError;
use crate::models::MemberResponse;
use crate::services::category::delete_all_owned;
use crate::services::token::SessionTokenManager;
use std::sync::Arc;

pub struct MemberService {
    db: Db,
    tokens: Arc<SessionTokenManager>,
}

impl MemberService {
    pub fn new(db: Db, tokens: Arc<SessionTokenManager>) -> Self {
        Self { db, tokens }
    }

    pub async fn find(&self, member_id: i64) -> Result<MemberResponse, AppError> {
        members::find_by_id(self.db.pool(), member_id)
            .await?
            .map(MemberResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("member {}", member_id)))
    }

    /// Delete the member and everything they own, then end their session.
    ///
    /// All rows go in one transaction: owned categories (with their
    /// schedules, subscriptions and external details), the member's
    /// subscriptions to other members' categories, the OAuth token and
    /// finally the member row.
    pub async fn delete(&self, member_id: i64) -> Result<(), AppError> {
        let mut tx = self.db.begin_immediate().await?;

        if members::find_by_id(&mut *tx, member_id).await?.is_none() {
            return Err(AppError::NotFound(format!("member {}", member_id)));
        }

        delete_all_owned(&mut *tx, member_id).await?;
        subscriptions::delete_by_member(&mut *tx, member_id).await?;
        oauth_tokens::delete_by_member(&mut *tx, member_id).await?;
        members::delete_by_id(&mut *tx, member_id).await?;
        tx.commit().await?;

        self.tokens.revoke(member_id);

        tracing::info!(member_id, "Member deleted");
        Ok(())
    }
}
