//! Bearer-token extractor for protected routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::debug;

use crate::auth::VerifiedToken;
use crate::error::AppError;
use crate::handlers::http::AppState;

/// Extractor: the verified token from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct AuthAccount(pub VerifiedToken);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|e| {
                    debug!(error = %e, "missing or malformed Authorization header");
                    AppError::TokenInvalid("missing or malformed Authorization header".to_string())
                })?;
        let verified = state.auth().verify(bearer.token())?;
        Ok(AuthAccount(verified))
    }
}
