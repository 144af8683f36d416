// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schedules inside categories.

use crate::db::schedules::NewSchedule;
use crate::db::{categories, schedules, Db};
use crate::error::AppError;
use crate::models::Schedule;
use crate::services::category::CategoryService;
use crate::time_utils::{format_utc_rfc3339, parse_rfc3339_utc};

/// Schedule fields supplied by a member.
#[derive(Debug, Clone)]
pub struct ScheduleDraft {
    pub title: String,
    /// RFC3339, any offset
    pub start_date_time: String,
    /// RFC3339, any offset
    pub end_date_time: String,
    pub memo: String,
}

#[derive(Clone)]
pub struct ScheduleService {
    db: Db,
    categories: CategoryService,
}

impl ScheduleService {
    pub fn new(db: Db, categories: CategoryService) -> Self {
        Self { db, categories }
    }

    /// Add a schedule to a category the member owns.
    ///
    /// Times are stored normalized to UTC so they sort lexically.
    pub async fn create(
        &self,
        member_id: i64,
        category_id: i64,
        draft: ScheduleDraft,
    ) -> Result<Schedule, AppError> {
        self.categories.find_owned(member_id, category_id).await?;

        let start = parse_rfc3339_utc(&draft.start_date_time).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid start time: {}", draft.start_date_time))
        })?;
        let end = parse_rfc3339_utc(&draft.end_date_time).ok_or_else(|| {
            AppError::BadRequest(format!("Invalid end time: {}", draft.end_date_time))
        })?;
        if start > end {
            return Err(AppError::BadRequest(
                "Schedule must not end before it starts".to_string(),
            ));
        }

        let start = format_utc_rfc3339(start);
        let end = format_utc_rfc3339(end);
        let schedule = schedules::insert(
            self.db.pool(),
            &NewSchedule {
                category_id,
                title: &draft.title,
                start_date_time: &start,
                end_date_time: &end,
                memo: &draft.memo,
            },
        )
        .await?;

        tracing::info!(member_id, category_id, schedule_id = schedule.id, "Schedule created");
        Ok(schedule)
    }

    /// Schedules of a category, earliest first.
    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Schedule>, AppError> {
        if categories::find_by_id(self.db.pool(), category_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!("category {}", category_id)));
        }
        schedules::find_by_category(self.db.pool(), category_id).await
    }

    pub async fn delete(&self, member_id: i64, schedule_id: i64) -> Result<(), AppError> {
        let schedule = schedules::find_by_id(self.db.pool(), schedule_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("schedule {}", schedule_id)))?;

        self.categories
            .find_owned(member_id, schedule.category_id)
            .await?;

        schedules::delete_by_id(self.db.pool(), schedule_id).await?;

        tracing::info!(member_id, schedule_id, "Schedule deleted");
        Ok(())
    }
}
