use axum::extract::FromRef;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired.")]
    Expired,
    #[error("Invalid token.")]
    Invalid,
}

/// Verifies access tokens issued by the accounts service.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.access_secret.as_bytes()),
            algorithm: cfg.algorithm,
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        JwtKeys::from(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn decode_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        debug!(user_id = ?data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }
}

/// Mints a token the way the accounts service does, `ttl_secs` may be negative.
#[cfg(test)]
pub(crate) fn sign_for_tests(cfg: &JwtConfig, user_id: Option<i64>, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        user_id,
        iat: (now - 60) as usize,
        exp: (now + ttl_secs) as usize,
    };
    encode(
        &Header::new(cfg.algorithm),
        &claims,
        &EncodingKey::from_secret(cfg.access_secret.as_bytes()),
    )
    .expect("sign test token")
}
