use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::AdminCredential;

/// Persistence for the admin credential. All mutual exclusion is delegated
/// to single-row conditional UPDATEs: a call that returns `false` observed
/// stale state and lost the race.
pub struct CredentialService;

const ADMIN_COLUMNS: &str = "id, username, password_hash, otp_code_hash, otp_expires_at, \
     otp_sent_at, otp_attempt_counter, created_at, updated_at";

impl CredentialService {
    /// Gets the credential by its (already normalized) username
    pub async fn get_by_username(
        pool: &PgPool,
        username: &str,
    ) -> AppResult<Option<AdminCredential>> {
        let admin = sqlx::query_as::<_, AdminCredential>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(admin)
    }

    /// Gets the oldest credential row, used by the bootstrap rename path
    pub async fn oldest(pool: &PgPool) -> AppResult<Option<AdminCredential>> {
        let admin = sqlx::query_as::<_, AdminCredential>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at ASC LIMIT 1"
        ))
        .fetch_optional(pool)
        .await?;

        Ok(admin)
    }

    /// Creates the credential row
    pub async fn create(
        pool: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> AppResult<AdminCredential> {
        let admin = sqlx::query_as::<_, AdminCredential>(&format!(
            "INSERT INTO admins (username, password_hash) VALUES ($1, $2) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(admin)
    }

    /// Rewrites the username (deployment rename during bootstrap)
    pub async fn rename(pool: &PgPool, id: i32, username: &str) -> AppResult<()> {
        sqlx::query("UPDATE admins SET username = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(username)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Replaces the long-lived password hash
    pub async fn set_password_hash(pool: &PgPool, id: i32, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE admins SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Arms a fresh one-time code: stores the hash, expiry and issuance
    /// time, and resets the attempt counter, in one conditional write
    /// guarded on the cooldown window. Returns false when a concurrent
    /// request armed a code inside the window first.
    pub async fn arm_otp(
        pool: &PgPool,
        id: i32,
        code_hash: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
        cooldown_seconds: i64,
    ) -> AppResult<bool> {
        let cooldown_floor = now - Duration::seconds(cooldown_seconds);

        let result = sqlx::query(
            r#"
            UPDATE admins
            SET otp_code_hash = $2,
                otp_expires_at = $3,
                otp_sent_at = $4,
                otp_attempt_counter = 0,
                updated_at = NOW()
            WHERE id = $1
              AND (otp_sent_at IS NULL OR otp_sent_at <= $5)
            "#,
        )
        .bind(id)
        .bind(code_hash)
        .bind(expires_at)
        .bind(now)
        .bind(cooldown_floor)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts a failed verification against the code instance that was
    /// actually checked. A re-issued code in between makes this a no-op.
    pub async fn record_failed_attempt(
        pool: &PgPool,
        id: i32,
        checked_hash: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE admins
            SET otp_attempt_counter = otp_attempt_counter + 1,
                updated_at = NOW()
            WHERE id = $1 AND otp_code_hash = $2
            "#,
        )
        .bind(id)
        .bind(checked_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes a verified code: clears hash and expiry together and resets
    /// the counter. Returns false when another verification consumed the
    /// same code first, which must be reported as a rejection.
    pub async fn consume_otp(pool: &PgPool, id: i32, checked_hash: &str) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE admins
            SET otp_code_hash = NULL,
                otp_expires_at = NULL,
                otp_attempt_counter = 0,
                updated_at = NOW()
            WHERE id = $1 AND otp_code_hash = $2
            "#,
        )
        .bind(id)
        .bind(checked_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
