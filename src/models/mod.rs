// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod category;
pub mod member;
pub mod oauth_token;
pub mod schedule;
pub mod subscription;

pub use category::{
    CategoriesResponse, Category, CategoryResponse, CategoryType, CategoryWithCreator,
    ExternalCategoryDetail, PERSONAL_CATEGORY_NAME,
};
pub use member::{Member, MemberResponse};
pub use oauth_token::OAuthToken;
pub use schedule::Schedule;
pub use subscription::{Color, Subscription};
