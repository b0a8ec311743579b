//! Password hashing and verification (Argon2id, PHC strings).

use crate::error::{AppError, AppResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Argon2id hasher with a configurable cost. Each hash gets a fresh random salt.
///
/// Verification reads the cost from the stored PHC string, so hashes made under older
/// settings keep verifying after the cost changes.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Build from raw costs: memory in KiB, iterations, lanes.
    pub fn from_costs(memory_kib: u32, iterations: u32, parallelism: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Config(format!("argon2 params: {}", e)))?;
        Ok(Self::new(params))
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("hash: {}", e)))?
            .to_string();
        Ok(hash)
    }

    /// Constant-time check of `password` against a stored PHC hash.
    pub fn verify(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|e| AppError::Internal(anyhow::anyhow!("parse hash: {}", e)))?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> PasswordHasher {
        PasswordHasher::from_costs(1024, 1, 1).unwrap()
    }

    #[test]
    fn hash_and_verify_password() {
        let hasher = fast();
        let hash = hasher.hash("mypassword").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("mypassword"));
        assert!(hasher.verify("mypassword", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
        assert!(!hasher.verify("mypassworD", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = fast();
        let a = hasher.hash("p@ss1").unwrap();
        let b = hasher.hash("p@ss1").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("p@ss1", &a).unwrap());
        assert!(hasher.verify("p@ss1", &b).unwrap());
    }

    #[test]
    fn verifies_hash_made_with_other_cost() {
        let old = PasswordHasher::from_costs(2048, 2, 1).unwrap();
        let hash = old.hash("p@ss1").unwrap();
        assert!(fast().verify("p@ss1", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(fast().verify("password", "invalid_hash").is_err());
    }

    #[test]
    fn rejects_invalid_costs() {
        assert!(matches!(
            PasswordHasher::from_costs(1, 0, 0),
            Err(AppError::Config(_))
        ));
    }
}
