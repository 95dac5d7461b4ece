pub mod auth;
pub mod consults;
pub mod doctors;
pub mod patients;
pub mod requests;
pub mod status;
pub mod users;

use axum::extract::{Query, rejection::QueryRejection};
use medconsult_core::Pagination;

use crate::error::AppError;

/// Unwrap `?page=&limit=`, reporting malformed values as validation errors
pub(crate) fn pagination(
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Pagination, AppError> {
    let Query(page) = query?;
    Ok(page)
}
