//! User CRUD handlers, one per (method, resource) pair.
//!
//! Each handler asks the access evaluator first and only then executes
//! the operation; the evaluator sees the canonical resource path built
//! from the parsed route id.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::user::{CreateUserRequest, UpdateUserRequest, UserResponse},
    middleware::MaybeAuthUser,
    services::policy,
    utils::ValidatedJson,
    AppState,
};

pub async fn create_user(
    State(state): State<AppState>,
    actor: MaybeAuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize(actor.claims(), &Method::POST, policy::USER_COLLECTION_PATH)?;

    let user = state.accounts.create(req).await?;
    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

pub async fn list_users(
    State(state): State<AppState>,
    actor: MaybeAuthUser,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize(actor.claims(), &Method::GET, policy::USER_COLLECTION_PATH)?;

    let users = state.accounts.list().await?;
    let body: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(body))
}

pub async fn get_user(
    State(state): State<AppState>,
    actor: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize(actor.claims(), &Method::GET, &policy::user_path(id))?;

    let user = state.accounts.get(id).await?;
    Ok(Json(user.sanitized()))
}

pub async fn update_user(
    State(state): State<AppState>,
    actor: MaybeAuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize(actor.claims(), &Method::PATCH, &policy::user_path(id))?;

    let user = state.accounts.update(id, req).await?;
    Ok(Json(user.sanitized()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    actor: MaybeAuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    policy::authorize(actor.claims(), &Method::DELETE, &policy::user_path(id))?;

    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
