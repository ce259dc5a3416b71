//! Argon2id password hashing.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use thiserror::Error;
use tracing::debug;

const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid hashing parameters: {0}")]
    Params(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error("Hashing task failed: {0}")]
    Task(String),
}

/// Hashes and checks passwords off the async runtime.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    /// Checked against when the account does not exist.
    dummy_hash: String,
}

impl CredentialHasher {
    /// Create a hasher with the given memory cost (KiB) and pass count.
    pub fn new(memory_kib: u32, iterations: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, "not-a-real-password")?;

        Ok(Self { argon2, dummy_hash })
    }

    /// Cheapest parameters argon2 accepts.
    pub fn low_cost() -> Result<Self, PasswordError> {
        Self::new(Params::MIN_M_COST, Params::MIN_T_COST)
    }

    /// Hash `password` into a PHC string.
    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hash_with(&argon2, &password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Check `password` against `stored`.
    ///
    /// With no stored hash the dummy hash is verified instead, so unknown
    /// accounts cost the same as a wrong password.
    pub async fn verify(&self, password: &str, stored: Option<&str>) -> Result<bool, PasswordError> {
        let argon2 = self.argon2.clone();
        let password = password.to_string();
        let known = stored.is_some();
        let hash = stored.unwrap_or(self.dummy_hash.as_str()).to_string();

        let matched = tokio::task::spawn_blocking(move || {
            match PasswordHash::new(&hash) {
                Ok(parsed) => argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
                Err(e) => {
                    debug!(error = %e, "Stored password hash is unreadable");
                    false
                }
            }
        })
        .await
        .map_err(|e| PasswordError::Task(e.to_string()))?;

        Ok(known && matched)
    }
}

fn hash_with(argon2: &Argon2<'_>, password: &str) -> Result<String, PasswordError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| PasswordError::Hash(e.to_string()))?;

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}
