use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use std::sync::Arc;
#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::error;

use crate::config::HashingConfig;

/// Salted Argon2id hashing with a configurable work factor.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    // same params as real hashes, so a miss costs as much as a mismatch
    dummy_hash: Arc<str>,
    #[cfg(test)]
    verifications: Arc<AtomicUsize>,
}

impl CredentialHasher {
    pub fn new(cfg: &HashingConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"dummy credential", &salt)
            .map_err(|e| anyhow::anyhow!("argon2 dummy hash: {e}"))?
            .to_string();
        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
            #[cfg(test)]
            verifications: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Burns one verification for a login whose email matched nobody.
    pub fn verify_dummy(&self, plain: &str) {
        let _ = self.verify(plain, &self.dummy_hash);
    }

    #[cfg(test)]
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    /// Fresh salt on every call, so equal inputs never share a hash.
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch. Errors only when the stored hash cannot be parsed.
    /// Parameters embedded in the stored hash win over the configured ones.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        #[cfg(test)]
        self.verifications.fetch_add(1, Ordering::SeqCst);
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
