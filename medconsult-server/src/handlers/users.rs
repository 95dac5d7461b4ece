use axum::{
    Extension,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::Json,
};
use medconsult_core::validation::{normalize_email, validate_user_update};
use medconsult_core::{Pagination, PasswordChangePayload, PublicUser, Role, UserUpdatePayload};
use serde_json::{Value, json};
use std::sync::Arc;

use super::pagination;
use crate::{AppState, auth::AuthUser, error::AppError, extract::Payload, services::UserService};

pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(UserService::new(&state).list(page)?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    Ok(Json(UserService::new(&state).get_by_id(&id)?))
}

pub async fn get_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let email = normalize_email(&email);
    Ok(Json(UserService::new(&state).get_by_email(&email)?))
}

pub async fn list_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(UserService::new(&state).list_by_name(&name, page)?))
}

pub async fn list_by_role(
    State(state): State<Arc<AppState>>,
    Path(role): Path<String>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    let role: Role = role.parse().map_err(AppError::Validation)?;
    let page = pagination(query)?;
    Ok(Json(UserService::new(&state).list_by_role(role, page)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    Payload(payload): Payload<UserUpdatePayload>,
) -> Result<Json<PublicUser>, AppError> {
    let changes = validate_user_update(&payload)?;
    Ok(Json(UserService::new(&state).update(&actor, &id, changes)?))
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<String>,
    Payload(payload): Payload<PasswordChangePayload>,
) -> Result<Json<Value>, AppError> {
    UserService::new(&state)
        .change_password(&actor, &id, &payload)
        .await?;
    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// DELETE /users/{id} (root only)
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let user = UserService::new(&state).delete(&id)?;
    Ok(Json(json!({ "message": "User deleted", "user": user })))
}
