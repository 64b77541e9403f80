use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use service_core::error::AppError;

use crate::{
    dtos::auth::{TokenObtainRequest, TokenRefreshRequest},
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Cookie carrying the refresh token alongside the response body.
pub const REFRESH_COOKIE: &str = "auth";

fn refresh_cookie(refresh: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, refresh);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

/// Obtain an access/refresh pair with email and password.
pub async fn obtain_token(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<TokenObtainRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state.auth.login(&req.email, &req.password).await?;

    let jar = jar.add(refresh_cookie(pair.refresh.clone()));
    Ok((StatusCode::OK, jar, Json(pair)))
}

/// Rotate a refresh token into a fresh pair. The presented token is
/// consumed; replaying it afterwards yields 401.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<TokenRefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let pair = state.auth.rotate(&req.refresh).await?;

    let jar = jar.add(refresh_cookie(pair.refresh.clone()));
    Ok((StatusCode::OK, jar, Json(pair)))
}

/// Blacklist a refresh token on logout.
pub async fn revoke_token(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<TokenRefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.logout(&req.refresh).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "detail": "Refresh token revoked" })),
    ))
}
