// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Calshare: shared calendar categories backed by Google sign-in
//!
//! This crate provides the backend API: Google OAuth onboarding, session
//! tokens, categories with subscriptions and schedules.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{
    AuthService, CategoryService, ColorPicker, MemberService, OAuthClient, ScheduleService,
    SessionTokenManager,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub auth_service: AuthService,
    pub category_service: CategoryService,
    pub schedule_service: ScheduleService,
    pub member_service: MemberService,
}

impl AppState {
    /// Wire every service over one database and one session token store.
    pub fn new(
        config: Config,
        db: Db,
        oauth: Arc<dyn OAuthClient>,
        colors: Arc<dyn ColorPicker>,
    ) -> Self {
        let tokens = Arc::new(SessionTokenManager::new(&config));
        let category_service = CategoryService::new(db.clone());

        Self {
            auth_service: AuthService::new(
                db.clone(),
                oauth,
                colors,
                tokens.clone(),
                config.oauth_state_key.clone(),
            ),
            schedule_service: ScheduleService::new(db.clone(), category_service.clone()),
            member_service: MemberService::new(db.clone(), tokens),
            category_service,
            config,
            db,
        }
    }
}
