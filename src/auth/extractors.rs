use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::error::ApiError;

/// Extracts and validates the bearer JWT, returning the user ID.
///
/// Runs before the body is read and never touches the database.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Read Authorization header
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Authorization header is missing".into()))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "Invalid Authorization header format. Expected 'Bearer <token>'".into(),
                )
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.decode_access_token(token.trim()).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            ApiError::Unauthorized(e.to_string())
        })?;

        // ids are BIGSERIAL, so zero or below never names a user
        let user_id = claims
            .user_id
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::Unauthorized("Invalid token payload".into()))?;

        Ok(AuthUser(user_id))
    }
}
