//! Credential service: account registration with Argon2id-hashed passwords and
//! login that issues signed, one-hour JWT access tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, ErrorPolicy};
pub use handlers::http::AppState;
pub use services::AuthService;

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the API router. Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/register",
            post(auth::register).fallback(http::route_not_found),
        )
        .route(
            "/api/login",
            post(auth::login).fallback(http::route_not_found),
        )
        .route("/api/me", get(auth::me).fallback(http::route_not_found))
        .route("/health", get(http::health))
        .fallback(http::route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
