// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth provider token store (one row per member).

use crate::error::AppError;
use crate::models::OAuthToken;
use crate::time_utils::now_rfc3339;
use sqlx::{Executor, Sqlite};

pub async fn find_by_member<'e, E>(
    executor: E,
    member_id: i64,
) -> Result<Option<OAuthToken>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let token = sqlx::query_as::<_, OAuthToken>(
        "SELECT id, member_id, refresh_token, updated_at FROM oauth_tokens WHERE member_id = ?",
    )
    .bind(member_id)
    .fetch_optional(executor)
    .await?;
    Ok(token)
}

/// Create the member's token row, or overwrite its refresh token.
pub async fn upsert<'e, E>(
    executor: E,
    member_id: i64,
    refresh_token: &str,
) -> Result<OAuthToken, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let token = sqlx::query_as::<_, OAuthToken>(
        "INSERT INTO oauth_tokens (member_id, refresh_token, updated_at) VALUES (?, ?, ?) \
         ON CONFLICT(member_id) DO UPDATE SET \
             refresh_token = excluded.refresh_token, \
             updated_at = excluded.updated_at \
         RETURNING id, member_id, refresh_token, updated_at",
    )
    .bind(member_id)
    .bind(refresh_token)
    .bind(now_rfc3339())
    .fetch_one(executor)
    .await?;
    Ok(token)
}

pub async fn delete_by_member<'e, E>(executor: E, member_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM oauth_tokens WHERE member_id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
