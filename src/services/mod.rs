//! Business logic: credential lifecycle and token issuance.

pub mod auth;

pub use auth::AuthService;
