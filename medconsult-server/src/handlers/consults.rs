use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use medconsult_core::validation::{parse_consult_date, validate_consult};
use medconsult_core::{Consult, ConsultPayload, Pagination};
use std::sync::Arc;

use super::pagination;
use crate::{AppState, error::AppError, extract::Payload, services::ConsultService};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<ConsultPayload>,
) -> Result<(StatusCode, Json<Consult>), AppError> {
    let fields = validate_consult(&payload)?;
    let consult = ConsultService::new(&state).create(fields)?;
    Ok((StatusCode::CREATED, Json(consult)))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Consult>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(ConsultService::new(&state).list(page)?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Consult>, AppError> {
    Ok(Json(ConsultService::new(&state).get_by_id(&id)?))
}

/// GET /consults/date/{date}: every consult on that calendar day (UTC)
pub async fn find_by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<Consult>>, AppError> {
    let day = parse_consult_date(&date)
        .ok_or_else(|| AppError::Validation("Invalid date format".to_string()))?
        .date_naive();
    Ok(Json(ConsultService::new(&state).find_by_date(day)?))
}

pub async fn find_by_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<String>,
) -> Result<Json<Vec<Consult>>, AppError> {
    Ok(Json(ConsultService::new(&state).find_by_doctor(&doctor_id)?))
}

pub async fn find_by_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Vec<Consult>>, AppError> {
    Ok(Json(ConsultService::new(&state).find_by_patient(&patient_id)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Payload(payload): Payload<ConsultPayload>,
) -> Result<Json<Consult>, AppError> {
    let fields = validate_consult(&payload)?;
    Ok(Json(ConsultService::new(&state).update(&id, fields)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ConsultService::new(&state).delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
