use log::info;
use rand::Rng;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::AdminCredential;
use crate::services::CredentialService;

/// Seeds or repairs the singleton admin credential at startup.
///
/// The oldest row is the canonical admin: if its username differs from the
/// configured one the row is renamed (deployment rename), otherwise it is
/// left alone. When no row exists one is created with a random password
/// hash; the real password arrives later via reset-password. Rows are
/// never deleted here.
pub async fn seed_admin(pool: &PgPool, config: &Config) -> AppResult<()> {
    let username = &config.admin.username;

    match CredentialService::oldest(pool).await? {
        Some(existing) if existing.username == *username => {
            info!("Admin credential already present for '{}'", username);
        }
        Some(existing) => {
            CredentialService::rename(pool, existing.id, username).await?;
            info!(
                "Renamed admin credential '{}' -> '{}'",
                existing.username, username
            );
        }
        None => {
            let placeholder: [u8; 16] = rand::rng().random();
            let password_hash =
                AdminCredential::hash_password(&hex::encode(placeholder), &config.hash)?;

            CredentialService::create(pool, username, &password_hash).await?;
            info!(
                "Created admin credential for '{}' (set a password via reset-password)",
                username
            );
        }
    }

    Ok(())
}
