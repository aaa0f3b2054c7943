//! Identity synchronisation with the remote session.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use bread_client::AppContext;
use bread_client::storage::{FileIdentityStore, IdentityStore};
use bread_client::supabase::AuthEvent;
use bread_core::UserRole;
use bread_integration_tests::{config_for, context_for, eventually, profile_json, token_json};
use httpmock::prelude::*;
use serde_json::json;

const USER_ID: &str = "6f1c2a4e-8d3b-4a57-9e21-3c5d7b9f0a12";

async fn mock_sign_in(server: &MockServer, role: &str) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/token")
                .query_param("grant_type", "password");
            then.status(200)
                .json_body(token_json(USER_ID, "baker@bread.io"));
        })
        .await;
    let profile = profile_json(USER_ID, "baker@bread.io", role);
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/profiles")
                .query_param("id", format!("eq.{USER_ID}"))
                .header("authorization", "Bearer access-token");
            then.status(200).json_body(profile);
        })
        .await;
}

#[tokio::test]
async fn test_login_loads_profile_into_memory_and_cache() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "admin").await;
    let (ctx, store) = context_for(&server);

    let response = ctx.auth().login("Baker@bread.io", "correct horse").await;

    assert!(response.success, "{:?}", response.error);
    let user = ctx.auth().current_user().unwrap();
    assert_eq!(user.id.to_string(), USER_ID);
    assert!(ctx.auth().is_admin());
    assert_eq!(store.load().unwrap(), Some(user));
}

#[tokio::test]
async fn test_login_rejected_reports_message() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
        })
        .await;
    let (ctx, _) = context_for(&server);

    let response = ctx.auth().login("baker@bread.io", "wrong").await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Invalid login credentials"));
    assert!(!ctx.auth().is_authenticated());
}

#[tokio::test]
async fn test_sign_in_without_profile_clears_identity() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/token");
            then.status(200)
                .json_body(token_json(USER_ID, "baker@bread.io"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/profiles");
            then.status(406)
                .json_body(json!({ "message": "JSON object requested, multiple (or no) rows returned" }));
        })
        .await;
    let (ctx, store) = context_for(&server);

    ctx.auth().login("baker@bread.io", "pw").await;

    assert!(ctx.auth().current_user().is_none());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_identity_even_when_revoke_fails() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "user").await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/logout");
            then.status(500).json_body(json!({ "msg": "upstream down" }));
        })
        .await;
    let (ctx, store) = context_for(&server);
    ctx.auth().login("baker@bread.io", "pw").await;
    assert!(ctx.auth().is_authenticated());

    let response = ctx.auth().logout().await;

    assert!(!response.success);
    // The listener may still be replaying the sign-in; it settles on the
    // sign-out that follows.
    let auth = ctx.auth().clone();
    assert!(eventually(|| auth.current_user().is_none()).await);
    assert!(eventually(|| store.load().unwrap().is_none()).await);
}

#[tokio::test]
async fn test_listener_follows_sign_out() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "user").await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/logout");
            then.status(204);
        })
        .await;
    let (ctx, store) = context_for(&server);
    ctx.auth().login("baker@bread.io", "pw").await;

    // Sign out below the service so only the listener sees it.
    ctx.client().sign_out().await.unwrap();

    let auth = ctx.auth().clone();
    assert!(eventually(|| !auth.is_authenticated()).await);
    assert!(eventually(|| store.load().unwrap().is_none()).await);
}

#[tokio::test]
async fn test_cached_identity_available_at_startup() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "user").await;
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("identity.json");

    {
        let store = Arc::new(FileIdentityStore::new(&cache_path));
        let ctx = AppContext::with_identity_store(config_for(&server), store).unwrap();
        ctx.auth().login("baker@bread.io", "pw").await;
        assert!(ctx.auth().is_authenticated());
    }

    let store = Arc::new(FileIdentityStore::new(&cache_path));
    let ctx = AppContext::with_identity_store(config_for(&server), store).unwrap();
    let user = ctx.auth().current_user().unwrap();
    assert_eq!(user.role, UserRole::Standard);
    assert_eq!(user.email.as_str(), "baker@bread.io");
}

#[tokio::test]
async fn test_signup_creates_standard_profile() {
    let server = MockServer::start_async().await;
    let signup = server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/signup");
            then.status(200)
                .json_body(token_json(USER_ID, "new@bread.io"));
        })
        .await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/profiles");
            then.status(201)
                .json_body(profile_json(USER_ID, "new@bread.io", "user"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/profiles");
            then.status(200)
                .json_body(profile_json(USER_ID, "new@bread.io", "user"));
        })
        .await;
    let (ctx, _) = context_for(&server);

    let response = ctx
        .auth()
        .signup("new@bread.io", "long enough", "New Baker")
        .await;

    signup.assert_async().await;
    insert.assert_async().await;
    assert!(response.success, "{:?}", response.error);
    assert_eq!(ctx.auth().current_user().unwrap().role, UserRole::Standard);
}

#[tokio::test]
async fn test_signup_announces_sign_in_only_after_profile_insert() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/auth/v1/signup");
            then.status(200)
                .json_body(token_json(USER_ID, "new@bread.io"));
        })
        .await;
    let insert = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/profiles")
                .header("authorization", "Bearer access-token");
            then.status(201)
                .delay(Duration::from_millis(300))
                .json_body(profile_json(USER_ID, "new@bread.io", "user"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/profiles");
            then.status(200)
                .json_body(profile_json(USER_ID, "new@bread.io", "user"));
        })
        .await;
    let (ctx, store) = context_for(&server);
    let mut events = ctx.client().on_auth_state_change();

    let auth = ctx.auth().clone();
    let started = Instant::now();
    let signup =
        tokio::spawn(async move { auth.signup("new@bread.io", "long enough", "New Baker").await });

    let event = events.recv().await.unwrap();
    assert!(matches!(event, AuthEvent::SignedIn(_)));
    assert!(
        started.elapsed() >= Duration::from_millis(300),
        "sign-in published before the profile row was written"
    );
    insert.assert_async().await;

    let response = signup.await.unwrap();
    assert!(response.success, "{:?}", response.error);

    // Give the listener time to replay the sign-in; it must not undo it.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(ctx.auth().is_authenticated());
    assert_eq!(store.load().unwrap().unwrap().id.to_string(), USER_ID);
}

#[tokio::test]
async fn test_refresh_resyncs_profile_with_new_token() {
    let server = MockServer::start_async().await;
    mock_sign_in(&server, "user").await;
    let refresh = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/auth/v1/token")
                .query_param("grant_type", "refresh_token")
                .json_body(json!({ "refresh_token": "refresh-token" }));
            then.status(200).json_body(json!({
                "access_token": "access-token-2",
                "refresh_token": "refresh-token-2",
                "expires_in": 3600,
                "user": { "id": USER_ID, "email": "baker@bread.io" }
            }));
        })
        .await;
    // The role changed server side while the old token was live.
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/profiles")
                .header("authorization", "Bearer access-token-2");
            then.status(200)
                .json_body(profile_json(USER_ID, "baker@bread.io", "admin"));
        })
        .await;
    let (ctx, store) = context_for(&server);
    ctx.auth().login("baker@bread.io", "pw").await;
    assert!(!ctx.auth().is_admin());

    let response = ctx.auth().refresh().await;

    refresh.assert_async().await;
    assert!(response.success, "{:?}", response.error);
    let auth = ctx.auth().clone();
    assert!(eventually(|| auth.is_admin()).await);
    assert!(eventually(|| store.load().unwrap().is_some_and(|u| u.role == UserRole::Admin)).await);
}

#[tokio::test]
async fn test_refresh_without_session_fails() {
    let server = MockServer::start_async().await;
    let (ctx, _) = context_for(&server);

    let response = ctx.auth().refresh().await;

    assert!(!response.success);
    assert!(response.error.unwrap().contains("No active session"));
    assert!(!ctx.auth().is_authenticated());
}

#[tokio::test]
async fn test_signup_rejects_malformed_email_locally() {
    let server = MockServer::start_async().await;
    let (ctx, _) = context_for(&server);

    let response = ctx.auth().signup("no-at-sign", "pw", "Nobody").await;

    assert!(!response.success);
    assert!(response.error.unwrap().starts_with("invalid email"));
}
