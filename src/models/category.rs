// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Category model, category types and API views.

use crate::models::MemberResponse;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Name of the PERSONAL category every member receives at onboarding.
pub const PERSONAL_CATEGORY_NAME: &str = "내 일정";

/// Kind of category.
///
/// Every member owns exactly one `Personal` category, created at first login.
/// `Google` categories are imported from an external calendar and carry an
/// external category detail row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    Personal,
    Normal,
    Google,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Personal => "PERSONAL",
            CategoryType::Normal => "NORMAL",
            CategoryType::Google => "GOOGLE",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown category type: {0}")]
pub struct UnknownCategoryType(String);

impl FromStr for CategoryType {
    type Err = UnknownCategoryType;

    /// Case-insensitive, so `normal` and `NORMAL` are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSONAL" => Ok(CategoryType::Personal),
            "NORMAL" => Ok(CategoryType::Normal),
            "GOOGLE" => Ok(CategoryType::Google),
            _ => Err(UnknownCategoryType(s.to_string())),
        }
    }
}

impl TryFrom<String> for CategoryType {
    type Error = UnknownCategoryType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Category row stored in the `categories` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Owner (creator) of the category
    pub member_id: i64,
    #[sqlx(try_from = "String")]
    pub category_type: CategoryType,
    pub created_at: String,
}

impl Category {
    pub fn is_personal(&self) -> bool {
        self.category_type == CategoryType::Personal
    }

    pub fn is_owned_by(&self, member_id: i64) -> bool {
        self.member_id == member_id
    }
}

/// Link from a GOOGLE category to the external calendar it was imported from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExternalCategoryDetail {
    pub id: i64,
    pub category_id: i64,
    /// Calendar id on the external provider
    pub external_id: String,
}

/// Category joined with its creator, as returned by lookups and searches.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryWithCreator {
    pub id: i64,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub category_type: CategoryType,
    pub created_at: String,
    pub creator_id: i64,
    pub creator_email: String,
    pub creator_display_name: String,
    pub creator_profile_image_url: Option<String>,
}

/// Category as exposed over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: i64,
    pub name: String,
    pub category_type: CategoryType,
    pub creator: MemberResponse,
    pub created_at: String,
    /// Linked calendar id, GOOGLE categories only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(optional))]
    pub external_id: Option<String>,
}

impl From<CategoryWithCreator> for CategoryResponse {
    fn from(row: CategoryWithCreator) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category_type: row.category_type,
            creator: MemberResponse {
                id: row.creator_id,
                email: row.creator_email,
                display_name: row.creator_display_name,
                profile_image_url: row.creator_profile_image_url,
            },
            created_at: row.created_at,
            external_id: None,
        }
    }
}

/// One page of categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoriesResponse {
    /// 0-based page index that was requested
    pub page: u32,
    pub categories: Vec<CategoryResponse>,
}
