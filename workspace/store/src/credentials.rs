//! Salted one-way password hashing.
//!
//! Hashes are PBKDF2-SHA256 in PHC string format with a random per-credential
//! salt. Verification goes through `password-hash`, whose output comparison is
//! constant-time.

use pbkdf2::{
    Params, Pbkdf2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::RngCore;
use tracing::{instrument, warn};

use crate::error::{Result, StoreError};

/// Length of the random salt generated for every credential, in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length, in bytes.
const OUTPUT_LEN: usize = 32;

#[derive(Clone, Copy, Debug)]
pub struct CredentialHasher {
    rounds: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROUNDS)
    }
}

impl CredentialHasher {
    /// Iteration count recommended for PBKDF2-SHA256.
    pub const DEFAULT_ROUNDS: u32 = 600_000;

    pub fn new(rounds: u32) -> Self {
        Self { rounds }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn hash(&self, password: &str) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| StoreError::Credential(e.to_string()))?;

        let params = Params {
            rounds: self.rounds,
            output_length: OUTPUT_LEN,
        };

        Pbkdf2
            .hash_password_customized(password.as_bytes(), None, None, params, &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| StoreError::Credential(e.to_string()))
    }

    /// Returns `false` for a mismatch and for a stored hash that cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(e) => {
                warn!("Stored credential is not a valid PHC string: {}", e);
                false
            }
        }
    }

    /// Hashes on the blocking pool so slow key derivation never stalls the runtime.
    #[instrument(skip_all)]
    pub async fn hash_blocking(&self, password: String) -> Result<String> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| StoreError::Credential(e.to_string()))?
    }

    #[instrument(skip_all)]
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = *self;
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(matched) => matched,
            Err(e) => {
                warn!("Credential verification task failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(1_000)
    }

    #[test]
    fn test_hash_is_salted_phc_string() {
        let first = hasher().hash("secret1").unwrap();
        let second = hasher().hash("secret1").unwrap();

        assert!(first.starts_with("$pbkdf2-sha256$"));
        assert!(!first.contains("secret1"));
        // A fresh salt per credential
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_matches_only_the_original_password() {
        let hash = hasher().hash("secret1").unwrap();

        assert!(hasher().verify("secret1", &hash));
        assert!(!hasher().verify("secret2", &hash));
        assert!(!hasher().verify("", &hash));
        assert!(!hasher().verify(&"x".repeat(1024), &hash));
    }

    #[test]
    fn test_verify_uses_rounds_from_the_stored_hash() {
        let hash = CredentialHasher::new(2_000).hash("secret1").unwrap();
        assert!(hasher().verify("secret1", &hash));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!hasher().verify("secret1", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_blocking_variants_agree() {
        let hash = hasher().hash_blocking("secret1".to_string()).await.unwrap();
        assert!(hasher().verify_blocking("secret1".to_string(), hash.clone()).await);
        assert!(!hasher().verify_blocking("wrong".to_string(), hash).await);
    }
}
