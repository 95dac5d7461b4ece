//! Bearer-token authentication and role authorization.
//!
//! Routes opt in per method: [`authenticate`] verifies the token and stores
//! the caller's [`AuthUser`] in the request extensions, and [`authorize`]
//! then checks the caller's role against the route's allowed set.
//!
//! The role is taken from the signed token without re-reading the user from
//! the store, so a role change only takes effect once the user logs in again
//! and receives a new token.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use medconsult_core::Role;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{AppState, error::AppError};

/// Roles allowed to manage doctors, patients, users and requests
pub const STAFF: &[Role] = &[Role::Root, Role::Employee];
/// Roles allowed to cancel consults
pub const CONSULT_CANCELLERS: &[Role] = &[Role::Root, Role::Employee, Role::Doctor];
pub const ROOT_ONLY: &[Role] = &[Role::Root];

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_root(&self) -> bool {
        self.role == Role::Root
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    iat: i64,
    exp: i64,
}

/// HS256 signing and verification keys derived from the shared secret
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_hours: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: chrono::Duration::hours(ttl_hours as i64),
        }
    }

    /// Issue a token carrying `{id, role}`
    pub fn issue(&self, user_id: &str, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            id: Some(user_id.to_string()),
            role: Some(role),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry; both the identity and the role claim must
    /// be present.
    pub fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AppError::unauthorized(format!("Invalid token: {}", e)))?;

        match (data.claims.id, data.claims.role) {
            (Some(id), Some(role)) if !id.is_empty() => Ok(AuthUser { id, role }),
            _ => Err(AppError::unauthorized("Invalid token: missing identity")),
        }
    }
}

/// Root passes every gate; everyone else must be in `allowed`.
pub fn is_permitted(role: Role, allowed: &[Role]) -> bool {
    role == Role::Root || allowed.contains(&role)
}

/// Authentication middleware
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        tracing::warn!(path = %request.uri().path(), "Authentication failed: missing bearer token");
        return Err(AppError::unauthorized("Authentication required"));
    };

    let user = state.tokens.verify(token).inspect_err(|e| {
        tracing::warn!(error = %e, "Authentication failed");
    })?;

    tracing::debug!(user_id = %user.id, role = %user.role, "Authenticated");
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Role gate; must run after [`authenticate`]
pub async fn authorize(
    State(allowed): State<&'static [Role]>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(user) = request.extensions().get::<AuthUser>() else {
        return Err(AppError::unauthorized("Authentication required"));
    };

    if !is_permitted(user.role, allowed) {
        tracing::warn!(
            user_id = %user.id,
            role = %user.role,
            path = %request.uri().path(),
            "Authorization denied"
        );
        return Err(AppError::forbidden("Insufficient permissions"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use jsonwebtoken::encode;

    const SECRET: &str = "super-secret-key-for-testing-only-1234567890";

    fn keys() -> TokenKeys {
        TokenKeys::new(SECRET, 8)
    }

    fn sign(claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys();
        let token = keys.issue("user-1", Role::Doctor).unwrap();
        let user = keys.verify(&token).unwrap();
        assert_eq!(
            user,
            AuthUser {
                id: "user-1".to_string(),
                role: Role::Doctor
            }
        );
    }

    #[test]
    fn test_token_expires_after_ttl() {
        let token = keys().issue("user-1", Role::Client).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);

        let claims = jsonwebtoken::decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap()
        .claims;
        let lifetime = claims["exp"].as_i64().unwrap() - claims["iat"].as_i64().unwrap();
        assert_eq!(lifetime, 8 * 3600);
        assert_eq!(claims["role"], "client");
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(serde_json::json!({
            "id": "user-1",
            "role": "root",
            "iat": now - 7200,
            "exp": now - 3600,
        }));
        let err = keys().verify(&token).unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_role_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(serde_json::json!({
            "id": "user-1",
            "iat": now,
            "exp": now + 3600,
        }));
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenKeys::new("another-secret", 8)
            .issue("user-1", Role::Root)
            .unwrap();
        assert!(keys().verify(&token).is_err());
        assert!(keys().verify("not-a-valid-jwt").is_err());
    }

    #[test]
    fn test_is_permitted() {
        assert!(is_permitted(Role::Root, &[]));
        assert!(is_permitted(Role::Root, STAFF));
        assert!(is_permitted(Role::Employee, STAFF));
        assert!(!is_permitted(Role::Doctor, STAFF));
        assert!(!is_permitted(Role::Client, STAFF));
        assert!(is_permitted(Role::Doctor, CONSULT_CANCELLERS));
        assert!(!is_permitted(Role::Employee, ROOT_ONLY));
    }
}
