use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::AdminCredential;
use crate::services::{CredentialService, Mailer, OtpService};

/// Every non-throttled request-code path returns this same message, so the
/// endpoint cannot be used to probe whether the account exists.
const REQUEST_CODE_ACK: &str = "If the account exists, a sign-in code has been sent";

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(default)]
    pub otp: String,
}

#[derive(Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

/// POST /api/admin/otp/request
/// Issue a one-time sign-in code for the configured admin
pub async fn request_otp(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
) -> AppResult<impl Responder> {
    OtpService::request_code(pool.get_ref(), config.get_ref(), mailer.get_ref()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: REQUEST_CODE_ACK,
    }))
}

/// POST /api/admin/otp/verify
/// Exchange a valid one-time code for a session token
pub async fn verify_otp(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    req: web::Json<VerifyOtpRequest>,
) -> AppResult<impl Responder> {
    let token = OtpService::verify_code(pool.get_ref(), config.get_ref(), &req.otp).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/admin/login
/// Legacy password login for the configured admin
pub async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    req: web::Json<PasswordRequest>,
) -> AppResult<impl Responder> {
    let password = req.password.trim();
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    // Unknown admin and wrong password are indistinguishable
    let admin = CredentialService::get_by_username(pool.get_ref(), &config.admin.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !admin.verify_password(password)? {
        return Err(AppError::InvalidCredentials);
    }

    let token = crate::auth::issue_token(&admin, &config.auth)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/admin/reset-password
/// Replace the admin password. Deliberately requires no re-authentication,
/// matching the deployed contract.
pub async fn reset_password(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    req: web::Json<PasswordRequest>,
) -> AppResult<impl Responder> {
    let password = req.password.trim();
    if password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }
    if password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let admin = CredentialService::get_by_username(pool.get_ref(), &config.admin.username)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;

    let password_hash = AdminCredential::hash_password(password, &config.hash)?;
    CredentialService::set_password_hash(pool.get_ref(), admin.id, &password_hash).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Password reset successfully",
    }))
}

/// Configure admin auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/admin")
            .route("/otp/request", web::post().to(request_otp))
            .route("/otp/verify", web::post().to(verify_otp))
            .route("/login", web::post().to(login))
            .route("/reset-password", web::post().to(reset_password)),
    );
}
