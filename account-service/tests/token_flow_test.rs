//! Issuance, rotation and revocation of token pairs over the HTTP surface.

mod common;

use account_service::{
    config::JwtConfig,
    services::{JwtService, ServiceError},
};
use axum::http::{header, StatusCode};
use common::*;
use uuid::Uuid;

#[tokio::test]
async fn login_returns_token_pair_and_auth_cookie() {
    let app = spawn_app().await;
    seed_user(&app, "superuser", "admin@mail.com", "123change", true, None).await;

    let response = send(
        &app.router,
        "POST",
        "/api/token",
        None,
        Some(serde_json::json!({ "email": "admin@mail.com", "password": "123change" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie missing")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("auth="));
    assert!(cookie.contains("HttpOnly"));

    let body = body_json(response).await;
    assert!(!body["access"].as_str().unwrap().is_empty());
    assert!(!body["refresh"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let app = spawn_app().await;
    seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;

    let mut bodies = Vec::new();
    for payload in [
        serde_json::json!({ "email": "test@mail.com", "password": "wrong-password" }),
        serde_json::json!({ "email": "nobody@mail.com", "password": "123change" }),
    ] {
        let response = send(&app.router, "POST", "/api/token", None, Some(payload)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        bodies.push(body_json(response).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["code"], "no_active_account");
}

#[tokio::test]
async fn refresh_rotates_into_a_distinct_pair() {
    let app = spawn_app().await;
    seed_user(&app, "superuser", "admin@mail.com", "123change", true, None).await;
    let (access, refresh) = obtain_token_pair(&app, "admin@mail.com", "123change").await;

    let response = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let new_access = body["access"].as_str().unwrap();
    let new_refresh = body["refresh"].as_str().unwrap();
    assert!(!new_access.is_empty());
    assert!(!new_refresh.is_empty());
    assert_ne!(new_refresh, refresh);
    assert_ne!(new_access, access);
}

#[tokio::test]
async fn reusing_a_rotated_refresh_token_fails_as_blacklisted() {
    let app = spawn_app().await;
    seed_user(&app, "superuser", "admin@mail.com", "123change", true, None).await;
    let (_, refresh) = obtain_token_pair(&app, "admin@mail.com", "123change").await;

    let first = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(second).await;
    assert_eq!(body["code"], "token_not_valid");
    assert!(body["detail"].as_str().unwrap().contains("blacklisted"));
}

#[tokio::test]
async fn garbage_refresh_token_is_rejected_as_invalid() {
    let app = spawn_app().await;

    let response = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": "not-a-jwt" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "token_not_valid");
    assert_eq!(body["detail"], "Token is invalid");
}

#[tokio::test]
async fn expired_refresh_token_is_rejected_as_expired() {
    let app = spawn_app().await;
    let user = seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;

    // same key, expiry in the past
    let expired_jwt = JwtService::new(&JwtConfig {
        signing_key: TEST_SIGNING_KEY.to_string(),
        access_token_expiry_minutes: 15,
        refresh_token_expiry_days: -2,
    })
    .unwrap();
    let stale = expired_jwt
        .generate_refresh_token(&user.id.to_string(), &Uuid::new_v4().to_string())
        .unwrap();

    let response = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": stale })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["code"], "token_not_valid");
    assert_eq!(body["detail"], "Token is expired");
}

#[tokio::test]
async fn access_token_is_not_accepted_for_rotation() {
    let app = spawn_app().await;
    seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;
    let (access, _) = obtain_token_pair(&app, "test@mail.com", "123change").await;

    let response = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": access })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["detail"], "Token is invalid");
}

#[tokio::test]
async fn logout_blacklists_the_refresh_token() {
    let app = spawn_app().await;
    seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;
    let (access, refresh) = obtain_token_pair(&app, "test@mail.com", "123change").await;

    let response = send(
        &app.router,
        "POST",
        "/api/token/logout",
        Some(&access),
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let replay = send(
        &app.router,
        "POST",
        "/api/token/refresh",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(replay).await;
    assert!(body["detail"].as_str().unwrap().contains("blacklisted"));
}

#[tokio::test]
async fn logout_requires_authentication() {
    let app = spawn_app().await;
    seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;
    let (_, refresh) = obtain_token_pair(&app, "test@mail.com", "123change").await;

    let response = send(
        &app.router,
        "POST",
        "/api/token/logout",
        None,
        Some(serde_json::json!({ "refresh": refresh })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn concurrent_rotations_of_one_token_have_a_single_winner() {
    let app = spawn_app().await;
    let user = seed_user(&app, "testuser", "test@mail.com", "123change", false, None).await;
    let pair = app.state.auth.issue(&user).await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let auth = app.state.auth.clone();
            let refresh = pair.refresh.clone();
            tokio::spawn(async move { auth.rotate(&refresh).await })
        })
        .collect();

    let mut successes = 0;
    let mut blacklisted = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => successes += 1,
            Err(ServiceError::TokenBlacklisted) => blacklisted += 1,
            Err(e) => panic!("unexpected rotation error: {e}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(blacklisted, 9);
}
