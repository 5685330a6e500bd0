// Token issuance helper. Nothing in the HTTP surface consumes these tokens;
// the operator CLI issues them for the frontend session layer.
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id: id.into(),
            kind: kind.into(),
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Sign a token with the configured secret and expiry.
pub fn generate_token(id: &str, kind: &str) -> Result<String, JwtError> {
    let security = &config::config().security;
    generate_token_with(&security.jwt_secret, security.jwt_expiry_hours, id, kind)
}

pub fn generate_token_with(secret: &str, expiry_hours: u64, id: &str, kind: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let claims = Claims::new(id, kind, expiry_hours);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}
