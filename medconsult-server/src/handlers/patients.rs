use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use medconsult_core::validation::validate_patient;
use medconsult_core::{Pagination, Patient, PatientPayload};
use std::sync::Arc;

use super::pagination;
use crate::{AppState, error::AppError, extract::Payload, services::PatientService};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<PatientPayload>,
) -> Result<(StatusCode, Json<Patient>), AppError> {
    let fields = validate_patient(&payload)?;
    let patient = PatientService::new(&state).create(fields)?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(PatientService::new(&state).list(page)?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Patient>, AppError> {
    Ok(Json(PatientService::new(&state).get_by_id(&id)?))
}

pub async fn find_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Patient>>, AppError> {
    Ok(Json(PatientService::new(&state).find_by_name(&name)?))
}

/// GET /patients/age/{age}; the segment must be a whole number
pub async fn find_by_age(
    State(state): State<Arc<AppState>>,
    Path(age): Path<String>,
) -> Result<Json<Vec<Patient>>, AppError> {
    let age: u32 = age
        .trim()
        .parse()
        .map_err(|_| AppError::Validation("Age must be a whole number".to_string()))?;
    Ok(Json(PatientService::new(&state).find_by_age(age)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Payload(payload): Payload<PatientPayload>,
) -> Result<Json<Patient>, AppError> {
    let fields = validate_patient(&payload)?;
    Ok(Json(PatientService::new(&state).update(&id, fields)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    PatientService::new(&state).delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
