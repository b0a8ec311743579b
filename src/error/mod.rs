//! Application error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::str::FromStr;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Token invalid: {0}")]
    TokenInvalid(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// A status code plus the message rendered as `{ "error": message }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn route_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Route not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Token failures surfaced by extractors on protected routes. Register/login statuses
/// come from [`ErrorPolicy`]; anything else reaching here is a 500.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let api = match &self {
            AppError::TokenExpired => ApiError::new(StatusCode::UNAUTHORIZED, "Token expired"),
            AppError::TokenInvalid(_) => ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token"),
            _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error"),
        };
        api.into_response()
    }
}

/// How register/login failures are reported to HTTP callers.
///
/// `Compatible` keeps the legacy contract: every register failure is a 500 and login
/// distinguishes a missing user (404) from a wrong password (401). `Hardened` gives
/// distinct register statuses and collapses both login failures into one 401 so
/// usernames cannot be enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Compatible,
    Hardened,
}

impl ErrorPolicy {
    pub fn register_failure(&self, err: &AppError) -> ApiError {
        match self {
            ErrorPolicy::Compatible => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error registering user")
            }
            ErrorPolicy::Hardened => match err {
                AppError::InvalidInput(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg.clone()),
                AppError::AccountExists(_) => {
                    ApiError::new(StatusCode::CONFLICT, "Account already exists")
                }
                AppError::StoreUnavailable(_) => {
                    ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Error registering user")
                }
                _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error registering user"),
            },
        }
    }

    pub fn login_failure(&self, err: &AppError) -> ApiError {
        match (self, err) {
            (ErrorPolicy::Compatible, AppError::UserNotFound) => {
                ApiError::new(StatusCode::NOT_FOUND, "User not found")
            }
            (ErrorPolicy::Compatible, AppError::InvalidCredentials) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Invalid password")
            }
            (ErrorPolicy::Hardened, AppError::UserNotFound | AppError::InvalidCredentials) => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Invalid credentials")
            }
            (ErrorPolicy::Hardened, AppError::InvalidInput(msg)) => {
                ApiError::new(StatusCode::BAD_REQUEST, msg.clone())
            }
            (ErrorPolicy::Hardened, AppError::StoreUnavailable(_)) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "Error logging in")
            }
            _ => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error logging in"),
        }
    }
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compatible" => Ok(ErrorPolicy::Compatible),
            "hardened" => Ok(ErrorPolicy::Hardened),
            other => Err(format!("unknown error policy: {}", other)),
        }
    }
}
