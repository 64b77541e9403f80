//! Test helpers for the account-service integration tests.
//!
//! Requests are driven straight through the router with `oneshot` over a
//! memory-backed state, so the suite needs no running Postgres or image
//! topic.

#![allow(dead_code)]

use account_service::{
    build_router,
    config::{
        AccountConfig, DatabaseConfig, Environment, ImageTopicConfig, JwtConfig, SecurityConfig,
    },
    models::User,
    services::{AuthService, ImagePublisher, JwtService, MockImagePublisher, UserService},
    store::{MemoryStore, RefreshTokenStore, UserStore},
    utils::hash_password,
    AppState,
};
use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_SIGNING_KEY: &str = "test-signing-key-at-least-32-chars!!";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub images: Arc<MockImagePublisher>,
}

pub fn test_config() -> AccountConfig {
    AccountConfig {
        common: service_core::config::Config { port: 8080 },
        environment: Environment::Dev,
        service_name: "account-service-test".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "debug".to_string(),
        log_json: false,
        database: DatabaseConfig {
            url: "postgres://localhost:5432/unused".to_string(),
            max_connections: 5,
            min_connections: 1,
        },
        jwt: JwtConfig {
            signing_key: TEST_SIGNING_KEY.to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        image_topic: ImageTopicConfig {
            url: "http://localhost:9999/image-topic".to_string(),
            enabled: false,
            timeout_seconds: 5,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .try_init();

    let config = test_config();
    let store = Arc::new(MemoryStore::new());
    let images = Arc::new(MockImagePublisher::new());

    let users: Arc<dyn UserStore> = store.clone();
    let tokens: Arc<dyn RefreshTokenStore> = store.clone();

    let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
    let auth = AuthService::new(users.clone(), tokens.clone(), jwt.clone());
    let accounts = UserService::new(users, tokens, images.clone() as Arc<dyn ImagePublisher>);

    let state = AppState {
        config,
        jwt,
        auth,
        accounts,
    };

    let router = build_router(state.clone())
        .await
        .expect("Failed to build router");

    TestApp {
        router,
        state,
        store,
        images,
    }
}

/// Insert a user with a real Argon2 hash of `password`.
pub async fn seed_user(
    app: &TestApp,
    username: &str,
    email: &str,
    password: &str,
    is_staff: bool,
    profile_image_id: Option<Uuid>,
) -> User {
    let mut user = User::new(
        username.to_string(),
        email.to_string(),
        hash_password(password).expect("Failed to hash password"),
    );
    user.is_staff = is_staff;
    user.profile_image_id = profile_image_id;

    UserStore::insert(app.store.as_ref(), &user)
        .await
        .expect("Failed to seed user");
    user
}

/// Fire a request through the router.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    };

    router
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

/// Log in through the HTTP surface and return (access, refresh).
pub async fn obtain_token_pair(app: &TestApp, email: &str, password: &str) -> (String, String) {
    let response = send(
        &app.router,
        "POST",
        "/api/token",
        None,
        Some(serde_json::json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["access"].as_str().expect("missing access").to_string(),
        body["refresh"].as_str().expect("missing refresh").to_string(),
    )
}
