// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use calshare::config::Config;
use calshare::db::Db;
use calshare::error::AppError;
use calshare::models::Color;
use calshare::routes::create_router;
use calshare::services::{ColorPicker, OAuthClient, OAuthMember, SessionTokens};
use calshare::AppState;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// OAuth provider that knows a fixed set of authorization codes.
#[derive(Default)]
pub struct FakeOAuthClient {
    profiles: Mutex<HashMap<String, OAuthMember>>,
    exchanges: AtomicUsize,
}

#[allow(dead_code)]
impl FakeOAuthClient {
    /// Register `code` as a valid code for `email`, with a provider
    /// refresh token of `google-refresh-{code}`.
    pub fn add_code(&self, code: &str, email: &str, display_name: &str) {
        self.profiles.lock().unwrap().insert(
            code.to_string(),
            OAuthMember {
                email: email.to_string(),
                display_name: display_name.to_string(),
                profile_image_url: None,
                refresh_token: format!("google-refresh-{}", code),
            },
        );
    }

    pub fn exchanges(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OAuthClient for FakeOAuthClient {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "https://accounts.example/auth?redirect_uri={}&state={}",
            urlencoding::encode(redirect_uri),
            state
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        _redirect_uri: &str,
    ) -> Result<OAuthMember, AppError> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .ok_or_else(|| AppError::AuthenticationFailed(format!("unknown code {}", code)))
    }
}

/// Always hands out the same color.
pub struct FixedColorPicker(pub Color);

impl ColorPicker for FixedColorPicker {
    fn pick(&self) -> Color {
        self.0
    }
}

/// Test harness: state over a private in-memory database.
#[allow(dead_code)]
pub struct TestApp {
    pub state: Arc<AppState>,
    pub oauth: Arc<FakeOAuthClient>,
}

/// Open a WAL file database under `dir`.
#[allow(dead_code)]
pub async fn file_db(dir: &std::path::Path) -> Db {
    let url = format!("sqlite:{}", dir.join("calshare.db").display());
    Db::connect(&url).await.expect("Failed to open file database")
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db = Db::connect_in_memory()
            .await
            .expect("Failed to open in-memory database");
        Self::with_db(db)
    }

    /// Harness over a pooled file database, for tests that need real
    /// concurrent connections.
    pub async fn on_file(dir: &std::path::Path) -> Self {
        Self::with_db(file_db(dir).await)
    }

    pub fn with_db(db: Db) -> Self {
        let oauth = Arc::new(FakeOAuthClient::default());
        let state = Arc::new(AppState::new(
            Config::test_default(),
            db,
            oauth.clone(),
            Arc::new(FixedColorPicker(Color::Color3)),
        ));
        Self { state, oauth }
    }

    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    pub fn db(&self) -> &Db {
        &self.state.db
    }

    /// Log in as `email`, onboarding the member on first use.
    pub async fn login(&self, email: &str) -> SessionTokens {
        let code = format!("code-{}", email);
        self.oauth.add_code(&code, email, email);
        self.state
            .auth_service
            .exchange_code_for_session(&code, "http://localhost:3000/callback", None)
            .await
            .expect("login failed")
    }

    /// Log in as `email` and return the member id.
    pub async fn member_id(&self, email: &str) -> i64 {
        let tokens = self.login(email).await;
        self.state
            .auth_service
            .resolve_member(&tokens.access_token)
            .await
            .expect("resolve failed")
    }

    /// Count rows in `table` matching a raw `WHERE` clause.
    pub async fn count(&self, table: &str, filter: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE {}", table, filter))
            .fetch_one(self.db().pool())
            .await
            .expect("count failed")
    }
}

/// Create a test app with offline fakes.
/// Returns the router and the harness.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, TestApp) {
    let app = TestApp::new().await;
    (app.router(), app)
}

/// Send one request through the router and decode the JSON body (if any).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
