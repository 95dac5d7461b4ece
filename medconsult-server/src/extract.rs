use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
};
use http_body_util::{BodyExt, LengthLimitError};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;

use crate::error::AppError;

/// JSON request body whose decode failures are reported as validation errors.
/// An empty body decodes as `{}` so that missing fields are caught by the
/// payload validators with their own messages.
pub struct Payload<T>(pub T);

/// True if the body stream was cut off by the request body limit
fn exceeded_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

impl<S, T> FromRequest<S> for Payload<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(request: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = request
            .into_body()
            .collect()
            .await
            .map_err(|e| {
                if exceeded_limit(&e) {
                    AppError::with_status(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
                } else {
                    AppError::Validation(format!("Failed to read request body: {}", e))
                }
            })?
            .to_bytes();

        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"{}"
        } else {
            &bytes
        };

        serde_json::from_slice(body)
            .map(Payload)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::Limited;
    use medconsult_core::LoginPayload;

    #[tokio::test]
    async fn test_empty_body_is_empty_object() {
        let request = Request::builder().body(Body::empty()).unwrap();
        let Payload(payload) = Payload::<LoginPayload>::from_request(request, &())
            .await
            .unwrap();
        assert!(payload.email.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let request = Request::builder().body(Body::from("{oops")).unwrap();
        let err = Payload::<LoginPayload>::from_request(request, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversize_body_is_payload_too_large() {
        let body = Body::new(Limited::new(Body::from(vec![b' '; 64]), 16));
        let request = Request::builder().body(body).unwrap();
        let err = Payload::<LoginPayload>::from_request(request, &())
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
