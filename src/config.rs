use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub admin: AdminConfig,
    pub auth: AuthConfig,
    pub otp: OtpConfig,
    pub hash: HashConfig,
    pub smtp: SmtpConfig,
    pub cors: CorsConfig,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// The single administrative principal, fixed per deployment.
/// The username is never taken from a request.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Identity key, lowercased and trimmed
    pub username: String,
    /// Recipient for one-time codes and enquiry notifications
    pub email: String,
}

/// Session token signing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Fixed token validity window in hours
    pub token_ttl_hours: i64,
}

/// One-time code policy
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Absolute code validity in minutes
    pub ttl_minutes: i64,
    /// Digits per code
    pub code_length: usize,
    /// Minimum interval between issuances in seconds
    pub cooldown_seconds: i64,
    /// Failed verifications tolerated before the code is dead
    pub max_attempts: i32,
}

/// Argon2id work-factor parameters for the long-lived password hash
#[derive(Debug, Clone)]
pub struct HashConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Outbound mail configuration. `host` unset means mail is disabled:
/// sends fail and are logged, the process keeps running.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
}

/// Cross-origin allow-list
#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            admin: AdminConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            otp: OtpConfig::from_env(),
            hash: HashConfig::from_env(),
            smtp: SmtpConfig::from_env(),
            cors: CorsConfig::from_env(),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            acquire_timeout: Duration::from_secs(
                env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            ),
            idle_timeout: Duration::from_secs(
                env::var("DATABASE_IDLE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .unwrap_or(600),
            ),
            max_lifetime: Duration::from_secs(
                env::var("DATABASE_MAX_LIFETIME_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse()
                    .unwrap_or(1800),
            ),
        })
    }
}

impl AdminConfig {
    /// Load the fixed admin identity from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env::var("ADMIN_USERNAME")
            .ok()
            .map(|u| u.trim().to_lowercase())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingAdminUsername)?;

        let email = env::var("ADMIN_EMAIL")
            .ok()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(ConfigError::MissingAdminEmail)?;

        Ok(Self { username, email })
    }
}

impl AuthConfig {
    /// Load token signing configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingJwtSecret)?;

        Ok(Self {
            jwt_secret,
            token_ttl_hours: env::var("TOKEN_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
        })
    }
}

impl OtpConfig {
    /// Load one-time code policy from environment variables
    pub fn from_env() -> Self {
        Self {
            ttl_minutes: env::var("OTP_TTL_MINUTES")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            code_length: env::var("OTP_CODE_LENGTH")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .unwrap_or(6),
            cooldown_seconds: env::var("OTP_COOLDOWN_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            max_attempts: env::var("OTP_MAX_ATTEMPTS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        }
    }
}

impl HashConfig {
    /// Load Argon2 work-factor parameters from environment variables
    pub fn from_env() -> Self {
        Self {
            memory_kib: env::var("ARGON2_MEMORY_KIB")
                .unwrap_or_else(|_| "19456".to_string())
                .parse()
                .unwrap_or(19456),
            iterations: env::var("ARGON2_ITERATIONS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .unwrap_or(2),
            parallelism: env::var("ARGON2_PARALLELISM")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
        }
    }
}

impl SmtpConfig {
    /// Load outbound mail configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@pressdesk.local".to_string()),
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Pressdesk".to_string()),
        }
    }
}

impl CorsConfig {
    /// Load the cross-origin allow-list from environment variables
    pub fn from_env() -> Self {
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self { allowed_origins }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
    MissingAdminUsername,
    MissingAdminEmail,
    MissingJwtSecret,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
            ConfigError::MissingAdminUsername => {
                write!(f, "ADMIN_USERNAME environment variable is required")
            }
            ConfigError::MissingAdminEmail => {
                write!(f, "ADMIN_EMAIL environment variable is required")
            }
            ConfigError::MissingJwtSecret => {
                write!(f, "JWT_SECRET environment variable is required")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
