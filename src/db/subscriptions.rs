// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Subscription store.

use crate::db::{delete_where_in, tables};
use crate::error::AppError;
use crate::models::{Color, Subscription};
use crate::time_utils::now_rfc3339;
use sqlx::{Executor, Sqlite};

pub async fn insert<'e, E>(
    executor: E,
    member_id: i64,
    category_id: i64,
    color: Color,
) -> Result<Subscription, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let subscription = sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions (member_id, category_id, color, created_at) \
         VALUES (?, ?, ?, ?) \
         RETURNING id, member_id, category_id, color, created_at",
    )
    .bind(member_id)
    .bind(category_id)
    .bind(color.as_str())
    .bind(now_rfc3339())
    .fetch_one(executor)
    .await?;
    Ok(subscription)
}

/// All subscriptions held by a member, oldest first.
pub async fn find_by_member<'e, E>(
    executor: E,
    member_id: i64,
) -> Result<Vec<Subscription>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let subscriptions = sqlx::query_as::<_, Subscription>(
        "SELECT id, member_id, category_id, color, created_at \
         FROM subscriptions WHERE member_id = ? ORDER BY id",
    )
    .bind(member_id)
    .fetch_all(executor)
    .await?;
    Ok(subscriptions)
}

pub async fn delete_by_category_ids<'e, E>(
    executor: E,
    category_ids: &[i64],
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    delete_where_in(executor, tables::SUBSCRIPTIONS, "category_id", category_ids).await
}

/// Delete every subscription a member holds, to anyone's categories.
pub async fn delete_by_member<'e, E>(executor: E, member_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM subscriptions WHERE member_id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
