//! Unit tests for configuration parsing
//!
//! Tests environment variable parsing and default values.
//!
//! Note: These tests modify global environment variables and must run serially.

use pressdesk::config::{AdminConfig, AuthConfig, CorsConfig, HashConfig, OtpConfig, SmtpConfig};
use serial_test::serial;

// =============================================================================
// OTP Policy Tests
// =============================================================================

#[test]
#[serial]
fn test_otp_config_defaults() {
    std::env::remove_var("OTP_TTL_MINUTES");
    std::env::remove_var("OTP_CODE_LENGTH");
    std::env::remove_var("OTP_COOLDOWN_SECONDS");
    std::env::remove_var("OTP_MAX_ATTEMPTS");

    let config = OtpConfig::from_env();

    assert_eq!(config.ttl_minutes, 5);
    assert_eq!(config.code_length, 6);
    assert_eq!(config.cooldown_seconds, 30);
    assert_eq!(config.max_attempts, 5);
}

#[test]
#[serial]
fn test_otp_config_custom_values() {
    std::env::set_var("OTP_TTL_MINUTES", "10");
    std::env::set_var("OTP_CODE_LENGTH", "8");
    std::env::set_var("OTP_COOLDOWN_SECONDS", "60");
    std::env::set_var("OTP_MAX_ATTEMPTS", "3");

    let config = OtpConfig::from_env();

    assert_eq!(config.ttl_minutes, 10);
    assert_eq!(config.code_length, 8);
    assert_eq!(config.cooldown_seconds, 60);
    assert_eq!(config.max_attempts, 3);

    // Clean up
    std::env::remove_var("OTP_TTL_MINUTES");
    std::env::remove_var("OTP_CODE_LENGTH");
    std::env::remove_var("OTP_COOLDOWN_SECONDS");
    std::env::remove_var("OTP_MAX_ATTEMPTS");
}

#[test]
#[serial]
fn test_otp_config_invalid_values_use_defaults() {
    std::env::set_var("OTP_TTL_MINUTES", "not-a-number");
    std::env::set_var("OTP_MAX_ATTEMPTS", "lots");

    let config = OtpConfig::from_env();

    assert_eq!(config.ttl_minutes, 5);
    assert_eq!(config.max_attempts, 5);

    // Clean up
    std::env::remove_var("OTP_TTL_MINUTES");
    std::env::remove_var("OTP_MAX_ATTEMPTS");
}

// =============================================================================
// Admin Identity Tests
// =============================================================================

#[test]
#[serial]
fn test_admin_config_normalizes_username() {
    std::env::set_var("ADMIN_USERNAME", "  Site-Admin  ");
    std::env::set_var("ADMIN_EMAIL", "owner@example.com");

    let config = AdminConfig::from_env().unwrap();

    assert_eq!(config.username, "site-admin");
    assert_eq!(config.email, "owner@example.com");

    // Clean up
    std::env::remove_var("ADMIN_USERNAME");
    std::env::remove_var("ADMIN_EMAIL");
}

#[test]
#[serial]
fn test_admin_config_requires_username_and_email() {
    std::env::remove_var("ADMIN_USERNAME");
    std::env::remove_var("ADMIN_EMAIL");

    assert!(AdminConfig::from_env().is_err());

    std::env::set_var("ADMIN_USERNAME", "admin");
    assert!(AdminConfig::from_env().is_err());

    std::env::set_var("ADMIN_EMAIL", "owner@example.com");
    assert!(AdminConfig::from_env().is_ok());

    // Clean up
    std::env::remove_var("ADMIN_USERNAME");
    std::env::remove_var("ADMIN_EMAIL");
}

// =============================================================================
// Token Config Tests
// =============================================================================

#[test]
#[serial]
fn test_auth_config_requires_secret() {
    std::env::remove_var("JWT_SECRET");
    std::env::remove_var("TOKEN_TTL_HOURS");

    assert!(AuthConfig::from_env().is_err());

    std::env::set_var("JWT_SECRET", "a-long-enough-test-secret");
    let config = AuthConfig::from_env().unwrap();
    assert_eq!(config.token_ttl_hours, 24);

    std::env::set_var("TOKEN_TTL_HOURS", "12");
    let config = AuthConfig::from_env().unwrap();
    assert_eq!(config.token_ttl_hours, 12);

    // Clean up
    std::env::remove_var("JWT_SECRET");
    std::env::remove_var("TOKEN_TTL_HOURS");
}

// =============================================================================
// Work Factor Tests
// =============================================================================

#[test]
#[serial]
fn test_hash_config_defaults() {
    std::env::remove_var("ARGON2_MEMORY_KIB");
    std::env::remove_var("ARGON2_ITERATIONS");
    std::env::remove_var("ARGON2_PARALLELISM");

    let config = HashConfig::from_env();

    assert_eq!(config.memory_kib, 19456);
    assert_eq!(config.iterations, 2);
    assert_eq!(config.parallelism, 1);
}

// =============================================================================
// CORS Tests
// =============================================================================

#[test]
#[serial]
fn test_cors_config_parses_comma_separated_list() {
    std::env::set_var(
        "ALLOWED_ORIGINS",
        "https://shop.example.com , https://www.example.com,,",
    );

    let config = CorsConfig::from_env();

    assert_eq!(
        config.allowed_origins,
        vec![
            "https://shop.example.com".to_string(),
            "https://www.example.com".to_string(),
        ]
    );

    // Clean up
    std::env::remove_var("ALLOWED_ORIGINS");
}

#[test]
#[serial]
fn test_cors_config_defaults_to_empty() {
    std::env::remove_var("ALLOWED_ORIGINS");

    let config = CorsConfig::from_env();

    assert!(config.allowed_origins.is_empty());
}

// =============================================================================
// SMTP Tests
// =============================================================================

#[test]
#[serial]
fn test_smtp_config_defaults() {
    std::env::remove_var("SMTP_HOST");
    std::env::remove_var("SMTP_PORT");
    std::env::remove_var("MAIL_FROM");
    std::env::remove_var("MAIL_FROM_NAME");

    let config = SmtpConfig::from_env();

    assert_eq!(config.host, None);
    assert_eq!(config.port, 587);
    assert_eq!(config.from_address, "noreply@pressdesk.local");
    assert_eq!(config.from_name, "Pressdesk");
}

#[test]
#[serial]
fn test_smtp_config_empty_host_means_disabled() {
    std::env::set_var("SMTP_HOST", "");

    let config = SmtpConfig::from_env();

    assert_eq!(config.host, None);

    // Clean up
    std::env::remove_var("SMTP_HOST");
}
