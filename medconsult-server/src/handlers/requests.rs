use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use medconsult_core::validation::validate_change_request;
use medconsult_core::{ChangeRequest, ChangeRequestPayload, Pagination};
use std::sync::Arc;

use super::pagination;
use crate::{AppState, error::AppError, extract::Payload, services::ChangeRequestService};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<ChangeRequestPayload>,
) -> Result<(StatusCode, Json<ChangeRequest>), AppError> {
    let fields = validate_change_request(&payload)?;
    let request = ChangeRequestService::new(&state).create(fields)?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<ChangeRequest>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(ChangeRequestService::new(&state).list(page)?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChangeRequest>, AppError> {
    Ok(Json(ChangeRequestService::new(&state).get_by_id(&id)?))
}
