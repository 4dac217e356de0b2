use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};
use crate::models::AdminCredential;

/// Claims carried by an admin session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Credential id
    pub sub: String,
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Issues a signed session token for the admin credential with the fixed
/// validity window from configuration. There is no refresh and no
/// revocation: the token stays valid until natural expiry.
pub fn issue_token(admin: &AdminCredential, config: &AuthConfig) -> AppResult<String> {
    let now = Utc::now();
    let expires = now + Duration::hours(config.token_ttl_hours);

    let claims = Claims {
        sub: admin.id.to_string(),
        username: admin.username.clone(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validates a session token and returns its claims. Expired or tampered
/// tokens are rejected with the same generic error.
pub fn verify_token(token: &str, config: &AuthConfig) -> AppResult<Claims> {
    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::InvalidCredentials)?;

    Ok(data.claims)
}

/// Extracts a bearer token from an Authorization header value
#[allow(dead_code)]
pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}
