use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id hash of `plain` with a fresh salt, computed on the blocking pool.
pub async fn hash_password(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!(error = %e, "password hashing failed");
                anyhow::anyhow!("hash password: {e}")
            })
    })
    .await
    .context("password hashing task")?
}

/// `Ok(false)` on a mismatch; an error only when the stored hash is unreadable.
pub async fn verify_password(plain: String, stored: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored).map_err(|e| {
            error!(error = %e, "stored password hash is malformed");
            anyhow::anyhow!("parse password hash: {e}")
        })?;
        Ok::<_, anyhow::Error>(
            Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
        )
    })
    .await
    .context("password verification task")?
}
