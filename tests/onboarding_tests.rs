// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member onboarding and session token tests.

use calshare::db::{categories, members, oauth_tokens, subscriptions};
use calshare::error::AppError;
use calshare::models::{CategoryType, Color, PERSONAL_CATEGORY_NAME};

mod common;
use common::TestApp;

const REDIRECT_URI: &str = "http://localhost:3000/callback";

#[tokio::test]
async fn test_first_login_creates_member_personal_category_and_subscription() {
    let app = TestApp::new().await;
    app.oauth.add_code("code-a", "a@x.com", "A");

    let tokens = app
        .state
        .auth_service
        .exchange_code_for_session("code-a", REDIRECT_URI, None)
        .await
        .unwrap();

    let member = members::find_by_email(app.db().pool(), "a@x.com")
        .await
        .unwrap()
        .expect("member created");
    assert_eq!(member.display_name, "A");

    let member_id = app
        .state
        .auth_service
        .resolve_member(&tokens.access_token)
        .await
        .unwrap();
    assert_eq!(member_id, member.id);

    let ids = categories::find_ids_by_member(app.db().pool(), member.id)
        .await
        .unwrap();
    assert_eq!(ids.len(), 1);
    let personal = categories::find_by_id(app.db().pool(), ids[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(personal.name, PERSONAL_CATEGORY_NAME);
    assert_eq!(personal.category_type, CategoryType::Personal);

    let subs = subscriptions::find_by_member(app.db().pool(), member.id)
        .await
        .unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].category_id, personal.id);
    assert_eq!(subs[0].color, Color::Color3);

    let token = oauth_tokens::find_by_member(app.db().pool(), member.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(token.refresh_token, "google-refresh-code-a");
}

#[tokio::test]
async fn test_second_login_reuses_member_and_overwrites_oauth_token() {
    let app = TestApp::new().await;
    app.oauth.add_code("first", "a@x.com", "A");
    app.oauth.add_code("second", "a@x.com", "A");

    app.state
        .auth_service
        .exchange_code_for_session("first", REDIRECT_URI, None)
        .await
        .unwrap();
    app.state
        .auth_service
        .exchange_code_for_session("second", REDIRECT_URI, None)
        .await
        .unwrap();

    assert_eq!(app.count("members", "1 = 1").await, 1);
    assert_eq!(app.count("categories", "1 = 1").await, 1);
    assert_eq!(app.count("subscriptions", "1 = 1").await, 1);
    assert_eq!(app.count("oauth_tokens", "1 = 1").await, 1);
    assert_eq!(
        app.count("oauth_tokens", "refresh_token = 'google-refresh-second'")
            .await,
        1
    );
}

#[tokio::test]
async fn test_failed_exchange_writes_nothing() {
    let app = TestApp::new().await;

    let result = app
        .state
        .auth_service
        .exchange_code_for_session("unknown", REDIRECT_URI, None)
        .await;

    assert!(matches!(result, Err(AppError::AuthenticationFailed(_))));
    assert_eq!(app.count("members", "1 = 1").await, 0);
    assert_eq!(app.count("oauth_tokens", "1 = 1").await, 0);
}

fn state_param(url: &str) -> String {
    url.split("state=")
        .nth(1)
        .expect("state in URL")
        .split('&')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_signed_state_is_accepted_for_its_redirect_uri() {
    let app = TestApp::new().await;
    app.oauth.add_code("code-a", "a@x.com", "A");

    let url = app
        .state
        .auth_service
        .generate_login_redirect(REDIRECT_URI)
        .unwrap();
    let state = state_param(&url);

    app.state
        .auth_service
        .exchange_code_for_session("code-a", REDIRECT_URI, Some(&state))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_state_for_other_redirect_uri_is_rejected_before_exchange() {
    let app = TestApp::new().await;
    app.oauth.add_code("code-a", "a@x.com", "A");

    let url = app
        .state
        .auth_service
        .generate_login_redirect("https://evil.example/callback")
        .unwrap();
    let state = state_param(&url);

    let result = app
        .state
        .auth_service
        .exchange_code_for_session("code-a", REDIRECT_URI, Some(&state))
        .await;

    assert!(matches!(result, Err(AppError::AuthenticationFailed(_))));
    assert_eq!(app.oauth.exchanges(), 0);

    let garbage = app
        .state
        .auth_service
        .exchange_code_for_session("code-a", REDIRECT_URI, Some("bm90LWEtc3RhdGU"))
        .await;
    assert!(matches!(garbage, Err(AppError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_renew_access_token() {
    let app = TestApp::new().await;
    let tokens = app.login("a@x.com").await;
    let auth = &app.state.auth_service;

    let access = auth.renew_access_token(&tokens.refresh_token).unwrap();
    let member_id = auth.resolve_member(&access).await.unwrap();
    let original = auth.resolve_member(&tokens.access_token).await.unwrap();
    assert_eq!(member_id, original);

    // Refresh tokens are not rotated by renewal.
    assert!(auth.renew_access_token(&tokens.refresh_token).is_ok());

    assert!(matches!(
        auth.renew_access_token("garbage"),
        Err(AppError::InvalidToken)
    ));
    assert!(matches!(
        auth.renew_access_token(&tokens.access_token),
        Err(AppError::InvalidToken)
    ));
}

#[tokio::test]
async fn test_new_login_supersedes_old_refresh_token() {
    let app = TestApp::new().await;
    let first = app.login("a@x.com").await;
    // Tokens issued within the same second are identical; wait for a new `iat`.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = app.login("a@x.com").await;
    assert_ne!(first.refresh_token, second.refresh_token);

    let auth = &app.state.auth_service;
    assert!(matches!(
        auth.renew_access_token(&first.refresh_token),
        Err(AppError::InvalidToken)
    ));
    assert!(auth.renew_access_token(&second.refresh_token).is_ok());
}

#[tokio::test]
async fn test_renew_after_member_deletion_has_no_token() {
    let app = TestApp::new().await;
    let tokens = app.login("a@x.com").await;
    let member_id = app
        .state
        .auth_service
        .resolve_member(&tokens.access_token)
        .await
        .unwrap();

    app.state.member_service.delete(member_id).await.unwrap();

    assert!(matches!(
        app.state
            .auth_service
            .renew_access_token(&tokens.refresh_token),
        Err(AppError::NoSuchToken)
    ));
    assert!(matches!(
        app.state
            .auth_service
            .resolve_member(&tokens.access_token)
            .await,
        Err(AppError::NotFound(_))
    ));
}
