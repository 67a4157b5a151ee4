//! JWT token generation and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::AppError;
use crate::model::Role;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Issued-at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Verified caller identity extracted from a token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

fn unix_now() -> Result<i64, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(now.as_secs() as i64)
}

/// Generate a signed token for a user
pub fn generate_token(
    user_id: &str,
    email: &str,
    role: Role,
    secret: &str,
    expiration_days: i64,
) -> Result<String, AppError> {
    let now = unix_now()?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role,
        iat: now,
        exp: now + expiration_days * 24 * 60 * 60,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

/// Validate and decode a token
///
/// Pure check: signature + expiry only, no revocation lookup. Any failure
/// (malformed, expired, bad signature) collapses to `Unauthenticated`.
pub fn validate_token(token: &str, secret: &str) -> Result<AuthUser, AppError> {
    let validation = Validation::default();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthenticated)?;

    Ok(AuthUser {
        user_id: token_data.claims.sub,
        email: token_data.claims.email,
        role: token_data.claims.role,
    })
}
