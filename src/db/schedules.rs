// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schedule store.

use crate::db::{delete_where_in, tables};
use crate::error::AppError;
use crate::models::Schedule;
use crate::time_utils::now_rfc3339;
use sqlx::{Executor, Sqlite};

const SCHEDULE_COLUMNS: &str =
    "id, category_id, title, start_date_time, end_date_time, memo, created_at";

/// Fields of a schedule to be inserted.
#[derive(Debug, Clone)]
pub struct NewSchedule<'a> {
    pub category_id: i64,
    pub title: &'a str,
    pub start_date_time: &'a str,
    pub end_date_time: &'a str,
    pub memo: &'a str,
}

pub async fn insert<'e, E>(executor: E, schedule: &NewSchedule<'_>) -> Result<Schedule, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let schedule = sqlx::query_as::<_, Schedule>(&format!(
        "INSERT INTO schedules (category_id, title, start_date_time, end_date_time, memo, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {}",
        SCHEDULE_COLUMNS
    ))
    .bind(schedule.category_id)
    .bind(schedule.title)
    .bind(schedule.start_date_time)
    .bind(schedule.end_date_time)
    .bind(schedule.memo)
    .bind(now_rfc3339())
    .fetch_one(executor)
    .await?;
    Ok(schedule)
}

pub async fn find_by_id<'e, E>(executor: E, schedule_id: i64) -> Result<Option<Schedule>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let schedule = sqlx::query_as::<_, Schedule>(&format!(
        "SELECT {} FROM schedules WHERE id = ?",
        SCHEDULE_COLUMNS
    ))
    .bind(schedule_id)
    .fetch_optional(executor)
    .await?;
    Ok(schedule)
}

/// Schedules of a category ordered by start time.
pub async fn find_by_category<'e, E>(
    executor: E,
    category_id: i64,
) -> Result<Vec<Schedule>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let schedules = sqlx::query_as::<_, Schedule>(&format!(
        "SELECT {} FROM schedules WHERE category_id = ? ORDER BY start_date_time, id",
        SCHEDULE_COLUMNS
    ))
    .bind(category_id)
    .fetch_all(executor)
    .await?;
    Ok(schedules)
}

pub async fn delete_by_id<'e, E>(executor: E, schedule_id: i64) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM schedules WHERE id = ?")
        .bind(schedule_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn delete_by_category_ids<'e, E>(
    executor: E,
    category_ids: &[i64],
) -> Result<u64, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    delete_where_in(executor, tables::SCHEDULES, "category_id", category_ids).await
}
