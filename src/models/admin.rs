use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::config::HashConfig;
use crate::error::AppError;

/// The persisted administrative credential. One row per deployment in
/// practice; the schema tolerates more but only the configured username is
/// ever addressed.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminCredential {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub otp_code_hash: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub otp_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub otp_attempt_counter: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Read-only view of the OTP columns, consumed by the decision functions.
///
/// Invariant: `code_hash` and `expires_at` are both set or both cleared.
#[derive(Debug, Clone)]
pub struct OtpSnapshot {
    pub code_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub attempts: i32,
}

impl AdminCredential {
    /// Hash a password using Argon2id with the configured work factor
    pub fn hash_password(password: &str, config: &HashConfig) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = argon2_instance(config)?;
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against the stored hash. The work factor is read
    /// back from the hash string itself.
    pub fn verify_password(&self, password: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(&self.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn otp_snapshot(&self) -> OtpSnapshot {
        OtpSnapshot {
            code_hash: self.otp_code_hash.clone(),
            expires_at: self.otp_expires_at,
            sent_at: self.otp_sent_at,
            attempts: self.otp_attempt_counter,
        }
    }
}

fn argon2_instance(config: &HashConfig) -> Result<Argon2<'static>, AppError> {
    let params = Params::new(
        config.memory_kib,
        config.iterations,
        config.parallelism,
        None,
    )
    .map_err(|e| AppError::Internal(format!("Invalid Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
