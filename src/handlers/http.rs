//! HTTP plumbing: shared state, health check, unmatched-route fallback.

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::services::AuthService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
}

impl AppState {
    pub fn new(auth_service: AuthService) -> Self {
        Self { auth_service }
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth_service
    }
}

/// GET /health — liveness check.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "credentials" })),
    )
}

/// Any route or method not otherwise matched.
pub async fn route_not_found() -> ApiError {
    ApiError::route_not_found()
}
