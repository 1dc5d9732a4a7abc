//! Salted one-way hashing for stored passwords.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! verification needs nothing besides the digest itself.

use argon2::{
    Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version,
    password_hash::{PasswordHash, SaltString, rand_core::OsRng},
};

use crate::error::BrainError;

/// Argon2id with fixed cost parameters. Cheap to clone.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT),
        }
    }

    /// Hash on the blocking pool; a fresh salt is drawn on every call.
    pub async fn hash(&self, plaintext: &str) -> Result<String, BrainError> {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash_blocking(&plaintext))
            .await
            .map_err(|e| BrainError::PasswordHash(e.to_string()))?
    }

    /// Verify on the blocking pool. Malformed digests verify as `false`.
    pub async fn verify(&self, plaintext: &str, digest: &str) -> bool {
        let hasher = self.clone();
        let plaintext = plaintext.to_owned();
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify_blocking(&plaintext, &digest))
            .await
            .unwrap_or(false)
    }

    pub fn hash_blocking(&self, plaintext: &str) -> Result<String, BrainError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| BrainError::PasswordHash(e.to_string()))
    }

    pub fn verify_blocking(&self, plaintext: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}
