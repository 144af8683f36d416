// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Category management and cascading deletion.
//!
//! Deleting a category removes its schedules, subscriptions and external
//! detail in the same transaction as the category row itself.

use crate::db::{
    categories, external_details, members, schedules, subscriptions, Db, PageRequest,
};
use crate::error::AppError;
use crate::models::{CategoriesResponse, Category, CategoryResponse, CategoryType};
use sqlx::SqliteConnection;

#[derive(Clone)]
pub struct CategoryService {
    db: Db,
}

impl CategoryService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a NORMAL (or first PERSONAL) category owned by `member_id`.
    pub async fn create(
        &self,
        member_id: i64,
        name: &str,
        category_type: CategoryType,
    ) -> Result<CategoryResponse, AppError> {
        let mut tx = self.db.begin_immediate().await?;

        if !members::exists_by_id(&mut *tx, member_id).await? {
            return Err(AppError::NotFound(format!("member {}", member_id)));
        }

        match category_type {
            CategoryType::Google => {
                return Err(AppError::InvalidOperation(
                    "GOOGLE categories are created from an external calendar".to_string(),
                ));
            }
            CategoryType::Personal => {
                if categories::exists_by_member_and_type(&mut *tx, member_id, CategoryType::Personal)
                    .await?
                {
                    return Err(AppError::InvalidOperation(
                        "Member already has a personal category".to_string(),
                    ));
                }
            }
            CategoryType::Normal => {}
        }

        let category = categories::insert(&mut *tx, member_id, name, category_type).await?;
        tx.commit().await?;

        tracing::info!(
            member_id,
            category_id = category.id,
            category_type = %category_type,
            "Category created"
        );

        self.find_by_id(category.id).await
    }

    /// Create a GOOGLE category linked to an external calendar.
    pub async fn create_external(
        &self,
        member_id: i64,
        name: &str,
        external_id: &str,
    ) -> Result<CategoryResponse, AppError> {
        let mut tx = self.db.begin_immediate().await?;

        if !members::exists_by_id(&mut *tx, member_id).await? {
            return Err(AppError::NotFound(format!("member {}", member_id)));
        }

        if external_details::exists_for_member(&mut *tx, member_id, external_id).await? {
            return Err(AppError::DuplicateExternalCategory(external_id.to_string()));
        }

        let category = categories::insert(&mut *tx, member_id, name, CategoryType::Google).await?;
        external_details::insert(&mut *tx, category.id, external_id).await?;
        tx.commit().await?;

        tracing::info!(
            member_id,
            category_id = category.id,
            external_id,
            "External category created"
        );

        self.find_by_id(category.id).await
    }

    /// Page of NORMAL categories whose name contains `name`.
    pub async fn search(&self, name: &str, page: PageRequest) -> Result<CategoriesResponse, AppError> {
        let rows =
            categories::search_by_name_and_type(self.db.pool(), name, CategoryType::Normal, page)
                .await?;

        Ok(CategoriesResponse {
            page: page.page,
            categories: rows.into_iter().map(CategoryResponse::from).collect(),
        })
    }

    /// Page of the member's own categories whose name contains `name`.
    pub async fn search_mine(
        &self,
        member_id: i64,
        name: &str,
        page: PageRequest,
    ) -> Result<CategoriesResponse, AppError> {
        let rows =
            categories::search_by_member_and_name(self.db.pool(), member_id, name, page).await?;

        Ok(CategoriesResponse {
            page: page.page,
            categories: rows.into_iter().map(CategoryResponse::from).collect(),
        })
    }

    /// Look up one category; GOOGLE categories carry their external calendar id.
    pub async fn find_by_id(&self, category_id: i64) -> Result<CategoryResponse, AppError> {
        let mut response = categories::find_with_creator(self.db.pool(), category_id)
            .await?
            .map(CategoryResponse::from)
            .ok_or_else(|| category_not_found(category_id))?;

        if response.category_type == CategoryType::Google {
            response.external_id = external_details::find_by_category(self.db.pool(), category_id)
                .await?
                .map(|detail| detail.external_id);
        }
        Ok(response)
    }

    /// Load a category and check that `member_id` owns it.
    pub async fn find_owned(&self, member_id: i64, category_id: i64) -> Result<Category, AppError> {
        let category = categories::find_by_id(self.db.pool(), category_id)
            .await?
            .ok_or_else(|| category_not_found(category_id))?;
        Self::assert_ownership(member_id, &category)?;
        Ok(category)
    }

    pub async fn rename(
        &self,
        member_id: i64,
        category_id: i64,
        name: &str,
    ) -> Result<CategoryResponse, AppError> {
        self.find_owned(member_id, category_id).await?;
        categories::update_name(self.db.pool(), category_id, name).await?;

        tracing::info!(member_id, category_id, "Category renamed");

        self.find_by_id(category_id).await
    }

    /// Delete a NORMAL or GOOGLE category together with everything hanging
    /// off it.
    pub async fn delete(&self, member_id: i64, category_id: i64) -> Result<(), AppError> {
        let mut tx = self.db.begin_immediate().await?;

        let category = categories::find_by_id(&mut *tx, category_id)
            .await?
            .ok_or_else(|| category_not_found(category_id))?;
        Self::assert_ownership(member_id, &category)?;
        if category.is_personal() {
            return Err(AppError::InvalidOperation(
                "The personal category cannot be deleted".to_string(),
            ));
        }

        let ids = [category_id];
        schedules::delete_by_category_ids(&mut *tx, &ids).await?;
        subscriptions::delete_by_category_ids(&mut *tx, &ids).await?;
        external_details::delete_by_category_ids(&mut *tx, &ids).await?;
        categories::delete_by_id(&mut *tx, category_id).await?;
        tx.commit().await?;

        tracing::info!(member_id, category_id, "Category deleted");
        Ok(())
    }

    /// Delete every category the member owns, PERSONAL included.
    pub async fn delete_all_for_member(&self, member_id: i64) -> Result<u64, AppError> {
        let mut tx = self.db.begin_immediate().await?;
        let deleted = delete_all_owned(&mut *tx, member_id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    pub fn assert_ownership(member_id: i64, category: &Category) -> Result<(), AppError> {
        if category.is_owned_by(member_id) {
            Ok(())
        } else {
            Err(AppError::NoPermission)
        }
    }
}

/// Cascade over all of a member's categories on an open connection.
///
/// Runs inside the caller's transaction so account deletion can chain
/// further deletes before committing.
pub(crate) async fn delete_all_owned(
    conn: &mut SqliteConnection,
    member_id: i64,
) -> Result<u64, AppError> {
    let ids = categories::find_ids_by_member(&mut *conn, member_id).await?;
    if ids.is_empty() {
        return Ok(0);
    }

    let schedule_count = schedules::delete_by_category_ids(&mut *conn, &ids).await?;
    let subscription_count = subscriptions::delete_by_category_ids(&mut *conn, &ids).await?;
    external_details::delete_by_category_ids(&mut *conn, &ids).await?;
    let category_count = categories::delete_by_member(&mut *conn, member_id).await?;

    tracing::info!(
        member_id,
        categories = category_count,
        schedules = schedule_count,
        subscriptions = subscription_count,
        "Deleted all categories of member"
    );

    Ok(category_count)
}

fn category_not_found(category_id: i64) -> AppError {
    AppError::NotFound(format!("category {}", category_id))
}
