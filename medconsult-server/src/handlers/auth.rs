use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use medconsult_core::validation::{validate_login, validate_register};
use medconsult_core::{LoginPayload, RegisterPayload};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{AppState, error::AppError, extract::Payload, services::AuthService};

/// Register (POST /auth/register)
pub async fn register(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<RegisterPayload>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let account = validate_register(&payload)?;
    let (user, token) = AuthService::new(&state).register(account).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    ))
}

/// Login (POST /auth/login)
pub async fn login(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<LoginPayload>,
) -> Result<Json<Value>, AppError> {
    let credentials = validate_login(&payload)?;
    let (user, token) = AuthService::new(&state).login(credentials).await?;
    Ok(Json(json!({ "user": user, "token": token })))
}
