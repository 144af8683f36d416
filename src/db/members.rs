// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member store.

use crate::db::is_write_conflict;
use crate::error::AppError;
use crate::models::Member;
use crate::time_utils::now_rfc3339;
use sqlx::{Executor, Sqlite};

const MEMBER_COLUMNS: &str = "id, email, display_name, profile_image_url, created_at";

/// Get a member by id.
pub async fn find_by_id<'e, E>(executor: E, member_id: i64) -> Result<Option<Member>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {} FROM members WHERE id = ?",
        MEMBER_COLUMNS
    ))
    .bind(member_id)
    .fetch_optional(executor)
    .await?;
    Ok(member)
}

/// Get a member by email.
pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<Member>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let member = sqlx::query_as::<_, Member>(&format!(
        "SELECT {} FROM members WHERE email = ?",
        MEMBER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(member)
}

pub async fn exists_by_id<'e, E>(executor: E, member_id: i64) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE id = ?)")
        .bind(member_id)
        .fetch_one(executor)
        .await?;
    Ok(exists)
}

/// Insert a new member.
///
/// Returns `None` if the insert lost to a concurrent writer (UNIQUE(email)
/// fired, or the transaction's snapshot went stale), so callers can roll
/// back and retry the lookup path.
pub async fn insert<'e, E>(
    executor: E,
    email: &str,
    display_name: &str,
    profile_image_url: Option<&str>,
) -> Result<Option<Member>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query_as::<_, Member>(&format!(
        "INSERT INTO members (email, display_name, profile_image_url, created_at) \
         VALUES (?, ?, ?, ?) RETURNING {}",
        MEMBER_COLUMNS
    ))
    .bind(email)
    .bind(display_name)
    .bind(profile_image_url)
    .bind(now_rfc3339())
    .fetch_one(executor)
    .await;

    match result {
        Ok(member) => Ok(Some(member)),
        Err(e) if is_write_conflict(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete a member row. Dependent rows must already be gone.
pub async fn delete_by_id<'e, E>(executor: E, member_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM members WHERE id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
