// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod category;
pub mod color;
pub mod google;
pub mod member;
pub mod oauth;
pub mod schedule;
pub mod token;

pub use auth::AuthService;
pub use category::CategoryService;
pub use color::{ColorPicker, RandomColorPicker};
pub use google::GoogleOAuthClient;
pub use member::MemberService;
pub use oauth::{OAuthClient, OAuthMember};
pub use schedule::{ScheduleDraft, ScheduleService};
pub use token::{Claims, SessionTokenManager, SessionTokens};
