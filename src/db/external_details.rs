// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! External category detail store (GOOGLE category ↔ external calendar id).

use crate::db::{delete_where_in, tables};
use crate::error::AppError;
use crate::models::{CategoryType, ExternalCategoryDetail};
use sqlx::{Executor, Sqlite};

pub async fn insert<'e, E>(
    executor: E,
    category_id: i64,
    external_id: &str,
) -> Result<ExternalCategoryDetail, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let detail = sqlx::query_as::<_, ExternalCategoryDetail>(
        "INSERT INTO external_category_details (category_id, external_id) VALUES (?, ?) \
         RETURNING id, category_id, external_id",
    )
    .bind(category_id)
    .bind(external_id)
    .fetch_one(executor)
    .await?;
    Ok(detail)
}

pub async fn find_by_category<'e, E>(
    executor: E,
    category_id: i64,
) -> Result<Option<ExternalCategoryDetail>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let detail = sqlx::query_as::<_, ExternalCategoryDetail>(
        "SELECT id, category_id, external_id FROM external_category_details WHERE category_id = ?",
    )
    .bind(category_id)
    .fetch_optional(executor)
    .await?;
    Ok(detail)
}

/// Whether `external_id` is already linked to one of the member's GOOGLE categories.
pub async fn exists_for_member<'e, E>(
    executor: E,
    member_id: i64,
    external_id: &str,
) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS( \
             SELECT 1 FROM external_category_details d \
             JOIN categories c ON c.id = d.category_id \
             WHERE c.member_id = ? AND c.category_type = ? AND d.external_id = ? \
         )",
    )
    .bind(member_id)
    .bind(CategoryType::Google.as_str())
    .bind(external_id)
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

pub async fn delete_by_category_ids<'e, E>(
    executor: E,
    category_ids: &[i64],
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    delete_where_in(
        executor,
        tables::EXTERNAL_CATEGORY_DETAILS,
        "category_id",
        category_ids,
    )
    .await
}
