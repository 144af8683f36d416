// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Category store.

use crate::db::{contains_pattern, delete_where_in, tables, PageRequest};
use crate::error::AppError;
use crate::models::{Category, CategoryType, CategoryWithCreator};
use crate::time_utils::now_rfc3339;
use sqlx::{Executor, Sqlite};

const CATEGORY_COLUMNS: &str = "id, name, member_id, category_type, created_at";

/// Category columns joined with the owning member, aliased to match
/// [`CategoryWithCreator`].
const WITH_CREATOR_SELECT: &str = "SELECT c.id, c.name, c.category_type, c.created_at, \
     m.id AS creator_id, m.email AS creator_email, \
     m.display_name AS creator_display_name, \
     m.profile_image_url AS creator_profile_image_url \
     FROM categories c JOIN members m ON m.id = c.member_id";

pub async fn insert<'e, E>(
    executor: E,
    member_id: i64,
    name: &str,
    category_type: CategoryType,
) -> Result<Category, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (name, member_id, category_type, created_at) \
         VALUES (?, ?, ?, ?) RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(name)
    .bind(member_id)
    .bind(category_type.as_str())
    .bind(now_rfc3339())
    .fetch_one(executor)
    .await?;
    Ok(category)
}

pub async fn find_by_id<'e, E>(executor: E, category_id: i64) -> Result<Option<Category>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE id = ?",
        CATEGORY_COLUMNS
    ))
    .bind(category_id)
    .fetch_optional(executor)
    .await?;
    Ok(category)
}

/// Category with its creator summary.
pub async fn find_with_creator<'e, E>(
    executor: E,
    category_id: i64,
) -> Result<Option<CategoryWithCreator>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, CategoryWithCreator>(&format!(
        "{} WHERE c.id = ?",
        WITH_CREATOR_SELECT
    ))
    .bind(category_id)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

/// Ids of every category the member owns.
pub async fn find_ids_by_member<'e, E>(executor: E, member_id: i64) -> Result<Vec<i64>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE member_id = ? ORDER BY id")
        .bind(member_id)
        .fetch_all(executor)
        .await?;
    Ok(ids)
}

pub async fn exists_by_member_and_type<'e, E>(
    executor: E,
    member_id: i64,
    category_type: CategoryType,
) -> Result<bool, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE member_id = ? AND category_type = ?)",
    )
    .bind(member_id)
    .bind(category_type.as_str())
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

/// Page of categories of one type whose name contains `name`.
///
/// SQLite `LIKE` is case-insensitive for ASCII.
pub async fn search_by_name_and_type<'e, E>(
    executor: E,
    name: &str,
    category_type: CategoryType,
    page: PageRequest,
) -> Result<Vec<CategoryWithCreator>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CategoryWithCreator>(&format!(
        "{} WHERE c.category_type = ? AND c.name LIKE ? ESCAPE '\\' \
         ORDER BY c.id LIMIT ? OFFSET ?",
        WITH_CREATOR_SELECT
    ))
    .bind(category_type.as_str())
    .bind(contains_pattern(name))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

/// Page of the member's own categories (any type) whose name contains `name`.
pub async fn search_by_member_and_name<'e, E>(
    executor: E,
    member_id: i64,
    name: &str,
    page: PageRequest,
) -> Result<Vec<CategoryWithCreator>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, CategoryWithCreator>(&format!(
        "{} WHERE c.member_id = ? AND c.name LIKE ? ESCAPE '\\' \
         ORDER BY c.id LIMIT ? OFFSET ?",
        WITH_CREATOR_SELECT
    ))
    .bind(member_id)
    .bind(contains_pattern(name))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn update_name<'e, E>(executor: E, category_id: i64, name: &str) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(name)
        .bind(category_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_id<'e, E>(executor: E, category_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    delete_where_in(executor, tables::CATEGORIES, "id", &[category_id]).await
}

/// Delete every category the member owns. Dependents must already be gone.
pub async fn delete_by_member<'e, E>(executor: E, member_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM categories WHERE member_id = ?")
        .bind(member_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
