//! Application error taxonomy and the single place errors become responses.

use axum::{
    extract::{Request, rejection::QueryRejection},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use medconsult_core::{User, ValidationError, Document};
use medconsult_store::StoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed or missing input (400)
    #[error("{0}")]
    Validation(String),

    /// Referenced entity absent (404)
    #[error("{0}")]
    NotFound(String),

    /// Any other client-facing failure with an explicit status
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Infrastructure failure; the detail is logged, never rendered
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, message)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        AppError::Internal(detail.into())
    }

    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Status {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Status { status, .. } => *status,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::Status { .. } | AppError::Internal(_) => "AppError",
        }
    }

    /// Message rendered to the client
    fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.message)
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { collection, .. } if collection == User::COLLECTION => {
                AppError::conflict("Email already registered")
            }
            StoreError::Duplicate { collection, .. } => {
                AppError::conflict(format!("Duplicate {}", entity_label(&collection)))
            }
            StoreError::NotFound { collection, .. } => {
                AppError::not_found(format!("{} not found", entity_label(&collection)))
            }
            other => AppError::internal(other.to_string()),
        }
    }
}

fn entity_label(collection: &str) -> &str {
    match collection {
        "users" => "User",
        "doctors" => "Doctor",
        "patients" => "Patient",
        "consults" => "Consult",
        "requests" => "Request",
        other => other,
    }
}

/// Attached to error responses so [`log_errors`] can report them
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "message": self.public_message() }))).into_response();
        response.extensions_mut().insert(ErrorReport {
            kind: self.kind(),
            detail: self.to_string(),
        });
        response
    }
}

/// Log every error response produced by an [`AppError`], with the request id
pub async fn log_errors(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;

    if let Some(report) = response.extensions().get::<ErrorReport>() {
        let status = response.status().as_u16();
        if response.status().is_server_error() {
            tracing::error!(
                error.kind = report.kind,
                status,
                request_id = %request_id,
                method = %method,
                path = %path,
                "{}",
                report.detail
            );
        } else {
            tracing::warn!(
                error.kind = report.kind,
                status,
                request_id = %request_id,
                method = %method,
                path = %path,
                "{}",
                report.detail
            );
        }
    }

    response
}
