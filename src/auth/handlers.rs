//! Auth HTTP handlers: register, login, me.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::{ApiError, AppError};
use crate::handlers::http::AppState;
use crate::middleware::auth::AuthAccount;
use crate::models::Role;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub username: String,
    #[serde(default)]
    #[validate(length(max = 1024))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidInput(rejection.body_text())
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let auth = state.auth();
    let Json(body) = body.map_err(|e| auth.policy().register_failure(&bad_body(e)))?;
    body.validate()
        .map_err(|e| auth.policy().register_failure(&AppError::InvalidInput(e.to_string())))?;

    auth.register(&body.username, &body.password, &body.email)
        .await
        .map_err(|e| auth.policy().register_failure(&e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let auth = state.auth();
    let Json(body) = body.map_err(|e| auth.policy().login_failure(&bad_body(e)))?;

    let token = auth
        .login(&body.username, &body.password)
        .await
        .map_err(|e| auth.policy().login_failure(&e))?;

    Ok(Json(LoginResponse { token }))
}

/// GET /api/me — echoes the bearer token's subject and role.
pub async fn me(AuthAccount(verified): AuthAccount) -> Json<MeResponse> {
    Json(MeResponse {
        username: verified.subject,
        role: verified.role,
    })
}
