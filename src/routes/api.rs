// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated members.

use crate::db::{PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::Result;
use crate::middleware::auth::AuthMember;
use crate::models::{CategoriesResponse, CategoryResponse, CategoryType, MemberResponse, Schedule};
use crate::services::ScheduleDraft;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via access token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/members/me", get(get_me).delete(delete_me))
        .route(
            "/api/categories",
            post(create_category).get(search_categories),
        )
        .route("/api/categories/external", post(create_external_category))
        .route("/api/categories/me", get(search_my_categories))
        .route(
            "/api/categories/{id}",
            get(get_category)
                .patch(rename_category)
                .delete(delete_category),
        )
        .route(
            "/api/categories/{id}/schedules",
            post(create_schedule).get(list_schedules),
        )
        .route("/api/schedules/{id}", delete(delete_schedule))
}

// ─── Members ─────────────────────────────────────────────────

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
) -> Result<Json<MemberResponse>> {
    Ok(Json(state.member_service.find(member.member_id).await?))
}

/// Delete the member's account and everything they own.
async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
) -> Result<StatusCode> {
    tracing::info!(member_id = member.member_id, "Member-initiated account deletion");

    state.member_service.delete(member.member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Categories ──────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    name: String,
    /// Defaults to NORMAL
    #[serde(default)]
    category_type: Option<CategoryType>,
}

#[derive(Deserialize, Validate)]
struct CreateExternalCategoryRequest {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    name: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    external_id: String,
}

#[derive(Deserialize, Validate)]
struct RenameCategoryRequest {
    #[validate(length(min = 1, max = 20, message = "must be 1 to 20 characters"))]
    name: String,
}

#[derive(Deserialize, Validate)]
struct SearchQuery {
    /// Substring to match; empty matches everything
    #[serde(default)]
    name: String,
    /// 0-indexed page number
    #[serde(default)]
    page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = MAX_PAGE_SIZE))]
    size: u32,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl SearchQuery {
    fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.size)
    }
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    body.validate()?;

    let category = state
        .category_service
        .create(
            member.member_id,
            &body.name,
            body.category_type.unwrap_or(CategoryType::Normal),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn create_external_category(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Json(body): Json<CreateExternalCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>)> {
    body.validate()?;

    let category = state
        .category_service
        .create_external(member.member_id, &body.name, &body.external_id)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn search_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<CategoriesResponse>> {
    params.validate()?;

    tracing::debug!(name = %params.name, page = params.page, size = params.size, "Searching categories");

    let page = state
        .category_service
        .search(&params.name, params.page_request())
        .await?;
    Ok(Json(page))
}

async fn search_my_categories(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<CategoriesResponse>> {
    params.validate()?;

    let page = state
        .category_service
        .search_mine(member.member_id, &params.name, params.page_request())
        .await?;
    Ok(Json(page))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<Json<CategoryResponse>> {
    Ok(Json(state.category_service.find_by_id(category_id).await?))
}

async fn rename_category(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Path(category_id): Path<i64>,
    Json(body): Json<RenameCategoryRequest>,
) -> Result<Json<CategoryResponse>> {
    body.validate()?;

    let category = state
        .category_service
        .rename(member.member_id, category_id, &body.name)
        .await?;
    Ok(Json(category))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Path(category_id): Path<i64>,
) -> Result<StatusCode> {
    state
        .category_service
        .delete(member.member_id, category_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─── Schedules ───────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct CreateScheduleRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1 to 50 characters"))]
    title: String,
    /// RFC3339
    start_date_time: String,
    /// RFC3339
    end_date_time: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    memo: String,
}

async fn create_schedule(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Path(category_id): Path<i64>,
    Json(body): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>)> {
    body.validate()?;

    let draft = ScheduleDraft {
        title: body.title,
        start_date_time: body.start_date_time,
        end_date_time: body.end_date_time,
        memo: body.memo,
    };

    let schedule = state
        .schedule_service
        .create(member.member_id, category_id, draft)
        .await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn list_schedules(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<i64>,
) -> Result<Json<Vec<Schedule>>> {
    Ok(Json(
        state.schedule_service.list_by_category(category_id).await?,
    ))
}

async fn delete_schedule(
    State(state): State<Arc<AppState>>,
    Extension(member): Extension<AuthMember>,
    Path(schedule_id): Path<i64>,
) -> Result<StatusCode> {
    state
        .schedule_service
        .delete(member.member_id, schedule_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_defaults() {
        let query: SearchQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.name, "");
        assert_eq!(query.page_request(), PageRequest::new(0, DEFAULT_PAGE_SIZE));
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_search_query_rejects_oversized_page() {
        let query: SearchQuery = serde_json::from_str(r#"{"size": 500}"#).unwrap();
        assert!(query.validate().is_err());
    }

    #[test]
    fn test_category_name_length_counts_characters() {
        let ok = RenameCategoryRequest {
            name: "가".repeat(20),
        };
        assert!(ok.validate().is_ok());

        let too_long = RenameCategoryRequest {
            name: "가".repeat(21),
        };
        assert!(too_long.validate().is_err());
    }
}
