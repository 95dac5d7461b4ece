//! medconsult - REST API for managing users, doctors, patients and consults.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod password;
pub mod services;

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{MethodRouter, delete, get, post, put},
};
use medconsult_core::Role;
use medconsult_store::DocumentStore;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::{CONSULT_CANCELLERS, ROOT_ONLY, STAFF, TokenKeys};
use crate::config::ServerConfig;
use crate::password::PasswordHasher;

/// Application state
pub struct AppState {
    pub store: DocumentStore,
    pub config: ServerConfig,
    pub tokens: TokenKeys,
    pub passwords: PasswordHasher,
}

impl AppState {
    /// Derive token keys and hashing parameters from `config`.
    /// Fails if no token secret is configured.
    pub fn new(store: DocumentStore, config: ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let secret = config
            .auth
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or("auth.jwt_secret (or MEDCONSULT_JWT_SECRET) must be set")?;
        let tokens = TokenKeys::new(secret, config.auth.token_ttl_hours);
        let passwords =
            PasswordHasher::new(config.auth.hash_memory_kib, config.auth.hash_iterations)?;

        Ok(Self {
            store,
            config,
            tokens,
            passwords,
        })
    }
}

type Route = MethodRouter<Arc<AppState>>;

/// Require a valid bearer token for every method in `route`
fn protected(state: &Arc<AppState>, route: Route) -> Route {
    route.route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::authenticate,
    ))
}

/// Require a valid bearer token carrying one of `allowed`
fn restricted(state: &Arc<AppState>, allowed: &'static [Role], route: Route) -> Route {
    let route = route.route_layer(middleware::from_fn_with_state(allowed, auth::authorize));
    protected(state, route)
}

/// Build the application router with all routes and middleware
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let register = if state.config.auth.open_registration {
        post(handlers::auth::register)
    } else {
        restricted(&state, ROOT_ONLY, post(handlers::auth::register))
    };

    Router::new()
        // Health and status
        .route("/health", get(handlers::status::health_check))
        .route("/status", get(handlers::status::status))
        // Auth
        .route("/auth/register", register)
        .route("/auth/login", post(handlers::auth::login))
        // Consults
        .route(
            "/consults",
            get(handlers::consults::list)
                .merge(protected(&state, post(handlers::consults::create))),
        )
        .route("/consults/id/{id}", get(handlers::consults::get_by_id))
        .route("/consults/date/{date}", get(handlers::consults::find_by_date))
        .route(
            "/consults/doctor/{doctor_id}",
            get(handlers::consults::find_by_doctor),
        )
        .route(
            "/consults/patient/{patient_id}",
            get(handlers::consults::find_by_patient),
        )
        .route(
            "/consults/{id}",
            protected(&state, put(handlers::consults::update)).merge(restricted(
                &state,
                CONSULT_CANCELLERS,
                delete(handlers::consults::delete),
            )),
        )
        // Doctors
        .route(
            "/doctors",
            get(handlers::doctors::list)
                .merge(restricted(&state, STAFF, post(handlers::doctors::create))),
        )
        .route("/doctors/id/{id}", get(handlers::doctors::get_by_id))
        .route("/doctors/name/{name}", get(handlers::doctors::find_by_name))
        .route(
            "/doctors/specialty/{specialty}",
            get(handlers::doctors::find_by_specialty),
        )
        .route(
            "/doctors/{id}",
            restricted(
                &state,
                STAFF,
                put(handlers::doctors::update).delete(handlers::doctors::delete),
            ),
        )
        // Patients
        .route(
            "/patients",
            get(handlers::patients::list)
                .merge(restricted(&state, STAFF, post(handlers::patients::create))),
        )
        .route("/patients/id/{id}", get(handlers::patients::get_by_id))
        .route("/patients/name/{name}", get(handlers::patients::find_by_name))
        .route("/patients/age/{age}", get(handlers::patients::find_by_age))
        .route(
            "/patients/{id}",
            restricted(
                &state,
                STAFF,
                put(handlers::patients::update).delete(handlers::patients::delete),
            ),
        )
        // Users
        .route(
            "/users",
            restricted(&state, STAFF, get(handlers::users::list)),
        )
        .route(
            "/users/id/{id}",
            restricted(&state, STAFF, get(handlers::users::get_by_id)),
        )
        .route(
            "/users/name/{name}",
            restricted(&state, STAFF, get(handlers::users::list_by_name)),
        )
        .route(
            "/users/email/{email}",
            restricted(&state, STAFF, get(handlers::users::get_by_email)),
        )
        .route(
            "/users/role/{role}",
            restricted(&state, STAFF, get(handlers::users::list_by_role)),
        )
        .route(
            "/users/{id}",
            protected(&state, put(handlers::users::update)).merge(restricted(
                &state,
                ROOT_ONLY,
                delete(handlers::users::delete),
            )),
        )
        .route(
            "/users/{id}/password",
            protected(&state, put(handlers::users::change_password)),
        )
        // Change requests
        .route(
            "/requests",
            restricted(
                &state,
                STAFF,
                get(handlers::requests::list).post(handlers::requests::create),
            ),
        )
        .route(
            "/requests/{id}",
            restricted(&state, STAFF, get(handlers::requests::get_by_id)),
        )
        // Middleware
        .layer(middleware::from_fn(error::log_errors))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_state(open_registration: bool) -> (Arc<AppState>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path().join("test.sqlite")).unwrap();
        let mut config = ServerConfig::default();
        config.auth.jwt_secret = Some("router-test-secret".to_string());
        config.auth.open_registration = open_registration;
        config.auth.hash_memory_kib = 1024;
        config.auth.hash_iterations = 1;
        (Arc::new(AppState::new(store, config).unwrap()), dir)
    }

    fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_state_requires_secret() {
        let dir = TempDir::new().unwrap();
        let store = DocumentStore::open(dir.path().join("test.sqlite")).unwrap();
        assert!(AppState::new(store, ServerConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_health_has_request_id() {
        let (state, _dir) = test_state(true);
        let response = build_router(state)
            .oneshot(request(Method::GET, "/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "medconsult");
    }

    #[tokio::test]
    async fn test_role_gate_on_user_listing() {
        let (state, _dir) = test_state(true);
        let client = state.tokens.issue("c1", Role::Client).unwrap();
        let employee = state.tokens.issue("e1", Role::Employee).unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/users", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Authentication required");

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/users", Some(&client)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["message"], "Insufficient permissions");

        let response = app
            .oneshot(request(Method::GET, "/users", Some(&employee)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_public_reads_stay_public() {
        let (state, _dir) = test_state(true);
        let app = build_router(state);

        for uri in ["/doctors", "/patients", "/consults", "/consults/doctor/none"] {
            let response = app
                .clone()
                .oneshot(request(Method::GET, uri, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }

        let response = app
            .oneshot(request(Method::DELETE, "/doctors/d1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_closed_registration_is_root_only() {
        let (state, _dir) = test_state(false);
        let employee = state.tokens.issue("e1", Role::Employee).unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/auth/register", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request(Method::POST, "/auth/register", Some(&employee)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_doctor_may_cancel_but_not_manage_doctors() {
        let (state, _dir) = test_state(true);
        let doctor = state.tokens.issue("doc", Role::Doctor).unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/consults/missing", Some(&doctor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Consult not found");

        let response = app
            .oneshot(request(Method::DELETE, "/doctors/missing", Some(&doctor)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_bad_pagination_is_validation_error() {
        let (state, _dir) = test_state(true);
        let response = build_router(state)
            .oneshot(request(Method::GET, "/doctors?page=abc", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_role_path_is_validation_error() {
        let (state, _dir) = test_state(true);
        let root = state.tokens.issue("r1", Role::Root).unwrap();
        let response = build_router(state)
            .oneshot(request(Method::GET, "/users/role/admin", Some(&root)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Role must be one of: root, client, doctor, employee"
        );
    }
}
