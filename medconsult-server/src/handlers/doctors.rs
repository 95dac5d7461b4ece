use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Json,
};
use medconsult_core::validation::validate_doctor;
use medconsult_core::{Doctor, DoctorPayload, Pagination};
use std::sync::Arc;

use super::pagination;
use crate::{AppState, error::AppError, extract::Payload, services::DoctorService};

pub async fn create(
    State(state): State<Arc<AppState>>,
    Payload(payload): Payload<DoctorPayload>,
) -> Result<(StatusCode, Json<Doctor>), AppError> {
    let fields = validate_doctor(&payload)?;
    let doctor = DoctorService::new(&state).create(fields)?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    let page = pagination(query)?;
    Ok(Json(DoctorService::new(&state).list(page)?))
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Doctor>, AppError> {
    Ok(Json(DoctorService::new(&state).get_by_id(&id)?))
}

pub async fn find_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(DoctorService::new(&state).find_by_name(&name)?))
}

pub async fn find_by_specialty(
    State(state): State<Arc<AppState>>,
    Path(specialty): Path<String>,
) -> Result<Json<Vec<Doctor>>, AppError> {
    Ok(Json(DoctorService::new(&state).find_by_specialty(&specialty)?))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Payload(payload): Payload<DoctorPayload>,
) -> Result<Json<Doctor>, AppError> {
    let fields = validate_doctor(&payload)?;
    Ok(Json(DoctorService::new(&state).update(&id, fields)?))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    DoctorService::new(&state).delete(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
