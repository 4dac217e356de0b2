use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use crate::auth::{generate_code, hash_code, token};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::OtpSnapshot;
use crate::services::{CredentialService, Mailer};

/// Generic rejection shared by the paths that must stay indistinguishable:
/// unknown admin, no code pending, wrong code, raced consume.
const GENERIC_REJECTION: &str = "Invalid or expired code";

/// Outcome of evaluating a code-issuance request against current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueDecision {
    /// Still inside the cooldown window; nothing may be mutated
    Throttled { retry_after_secs: i64 },
    /// A fresh code may be generated and armed
    Issue,
}

/// Outcome of evaluating a submitted code against current state.
///
/// The short-circuit order matters: lockout and expiry are checked before
/// the hash comparison so that neither path ever touches the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyDecision {
    /// No code is pending (or the credential does not exist)
    NoPending,
    /// The attempt counter reached the maximum; only re-issuance helps
    LockedOut,
    /// The pending code is past its expiry
    Expired,
    /// Hashes differ; counts as a failed attempt
    Mismatch,
    /// Hashes match; the code must now be consumed
    Match,
}

/// Decides whether a new code may be issued. Pure over the snapshot and
/// the clock.
pub fn issue_decision(
    snapshot: &OtpSnapshot,
    now: DateTime<Utc>,
    cooldown_seconds: i64,
) -> IssueDecision {
    if let Some(sent_at) = snapshot.sent_at {
        let elapsed = now - sent_at;
        if elapsed < Duration::seconds(cooldown_seconds) {
            let retry_after_secs = (cooldown_seconds - elapsed.num_seconds()).max(1);
            return IssueDecision::Throttled { retry_after_secs };
        }
    }

    IssueDecision::Issue
}

/// Decides the fate of a submitted code. Pure over the snapshot, the
/// submitted hash and the clock.
pub fn verify_decision(
    snapshot: &OtpSnapshot,
    submitted_hash: &str,
    now: DateTime<Utc>,
    max_attempts: i32,
) -> VerifyDecision {
    let (stored_hash, expires_at) = match (&snapshot.code_hash, snapshot.expires_at) {
        (Some(hash), Some(expires_at)) => (hash, expires_at),
        _ => return VerifyDecision::NoPending,
    };

    if snapshot.attempts >= max_attempts {
        return VerifyDecision::LockedOut;
    }

    if expires_at <= now {
        return VerifyDecision::Expired;
    }

    if stored_hash != submitted_hash {
        return VerifyDecision::Mismatch;
    }

    VerifyDecision::Match
}

/// Orchestrates the one-time-code lifecycle against the credential store
/// and the notification gateway.
pub struct OtpService;

impl OtpService {
    /// Issues a one-time code for the configured admin and dispatches it by
    /// email without awaiting the send.
    ///
    /// Ok(()) means the caller gets the generic acknowledgment. An absent
    /// credential also returns Ok(()) so the endpoint cannot be used to
    /// probe for account existence; only throttling is distinguishable.
    pub async fn request_code(pool: &PgPool, config: &Config, mailer: &Mailer) -> AppResult<()> {
        let admin =
            match CredentialService::get_by_username(pool, &config.admin.username).await? {
                Some(admin) => admin,
                None => {
                    log::warn!("OTP requested but no admin credential exists");
                    return Ok(());
                }
            };

        let now = Utc::now();
        match issue_decision(&admin.otp_snapshot(), now, config.otp.cooldown_seconds) {
            IssueDecision::Throttled { retry_after_secs } => Err(AppError::RateLimited(format!(
                "Please wait {} seconds before requesting a new code",
                retry_after_secs
            ))),
            IssueDecision::Issue => {
                let code = generate_code(config.otp.code_length);
                let expires_at = now + Duration::minutes(config.otp.ttl_minutes);

                let armed = CredentialService::arm_otp(
                    pool,
                    admin.id,
                    &hash_code(&code),
                    expires_at,
                    now,
                    config.otp.cooldown_seconds,
                )
                .await?;

                if !armed {
                    // A concurrent request won the conditional update
                    return Err(AppError::RateLimited(
                        "A code was just sent, please wait before requesting a new one"
                            .to_string(),
                    ));
                }

                // Fire-and-forget: the response never waits on, or fails
                // because of, the dispatch.
                let mailer = mailer.clone();
                let recipient = config.admin.email.clone();
                let ttl_minutes = config.otp.ttl_minutes;
                tokio::spawn(async move {
                    if let Err(e) = mailer.send_otp_email(&recipient, &code, ttl_minutes).await {
                        log::error!("OTP email dispatch failed: {}", e);
                    }
                });

                Ok(())
            }
        }
    }

    /// Verifies a submitted code and, on success, consumes it and returns a
    /// signed session token.
    pub async fn verify_code(pool: &PgPool, config: &Config, submitted: &str) -> AppResult<String> {
        let submitted = submitted.trim();
        if submitted.is_empty() {
            return Err(AppError::Validation("Code is required".to_string()));
        }

        let admin =
            match CredentialService::get_by_username(pool, &config.admin.username).await? {
                Some(admin) => admin,
                None => return Err(AppError::CodeRejected(GENERIC_REJECTION.to_string())),
            };

        let snapshot = admin.otp_snapshot();
        let submitted_hash = hash_code(submitted);

        match verify_decision(&snapshot, &submitted_hash, Utc::now(), config.otp.max_attempts) {
            VerifyDecision::NoPending => {
                Err(AppError::CodeRejected(GENERIC_REJECTION.to_string()))
            }
            VerifyDecision::LockedOut => Err(AppError::RateLimited(
                "Too many failed attempts, request a new code".to_string(),
            )),
            VerifyDecision::Expired => Err(AppError::CodeRejected(
                "Code has expired, request a new one".to_string(),
            )),
            VerifyDecision::Mismatch => {
                let stored_hash = snapshot.code_hash.as_deref().unwrap_or_default();
                CredentialService::record_failed_attempt(pool, admin.id, stored_hash).await?;
                Err(AppError::CodeRejected(GENERIC_REJECTION.to_string()))
            }
            VerifyDecision::Match => {
                let consumed =
                    CredentialService::consume_otp(pool, admin.id, &submitted_hash).await?;
                if !consumed {
                    // Another verification consumed this code first
                    return Err(AppError::CodeRejected(GENERIC_REJECTION.to_string()));
                }

                token::issue_token(&admin, &config.auth)
            }
        }
    }
}
