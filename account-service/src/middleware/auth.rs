use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
    response::{IntoResponse, Response},
};
use service_core::error::AppError;

use crate::{services::AccessTokenClaims, AppState};

/// Extractor for the request's authenticated principal, if any.
///
/// No Authorization header means an anonymous request (the access
/// evaluator decides what anonymous callers may do); a present but
/// malformed or invalid bearer token is rejected with 401 before the
/// handler runs.
pub struct MaybeAuthUser(pub Option<AccessTokenClaims>);

impl MaybeAuthUser {
    pub fn claims(&self) -> Option<&AccessTokenClaims> {
        self.0.as_ref()
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(value) = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(MaybeAuthUser(None));
        };

        let Some(token) = value.strip_prefix("Bearer ") else {
            return Err(AppError::Unauthorized {
                code: "token_not_valid",
                detail: "Malformed Authorization header".to_string(),
            }
            .into_response());
        };

        let claims = state
            .jwt
            .validate_access_token(token)
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(MaybeAuthUser(Some(claims)))
    }
}

/// Extractor that requires an authenticated principal.
pub struct AuthUser(pub AccessTokenClaims);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match MaybeAuthUser::from_request_parts(parts, state).await? {
            MaybeAuthUser(Some(claims)) => Ok(AuthUser(claims)),
            MaybeAuthUser(None) => Err(AppError::Unauthorized {
                code: "token_not_valid",
                detail: "Authentication credentials were not provided".to_string(),
            }
            .into_response()),
        }
    }
}
