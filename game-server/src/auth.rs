use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use game_types::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("failed to sign token")]
    Signing,
}

const TOKEN_TTL_HOURS: i64 = 24;

/// Bearer-token identity. Tokens are HS256 JWTs carrying the username; in
/// dev mode a token is the bare username so clients can be driven by hand.
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    dev_mode: bool,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            dev_mode: false,
        }
    }

    pub fn new_dev_mode() -> Self {
        Self {
            dev_mode: true,
            ..Self::new("dev")
        }
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_HOURS * 3600,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|err| {
            tracing::error!("failed to sign token: {err}");
            AuthError::Signing
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        if self.dev_mode {
            if token.is_empty() {
                return Err(AuthError::InvalidToken);
            }
            return Ok(User::new(token));
        }

        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|err| {
            tracing::warn!("token validation failed: {err}");
            AuthError::InvalidToken
        })?;
        Ok(User::new(data.claims.sub))
    }
}
