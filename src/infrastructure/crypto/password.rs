//! Password hashing utilities
//!
//! bcrypt hashes are self-describing (`$2b$<cost>$<salt><digest>`), so
//! verification needs nothing but the stored string.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::domain::DomainError;

/// Lowest and highest cost accepted by bcrypt.
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// bcrypt hasher with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash with a fresh random salt. Two calls never return the same string.
    pub fn hash(&self, password: &str) -> Result<String, DomainError> {
        hash(password, self.cost).map_err(|e| DomainError::Hashing(e.to_string()))
    }

    /// Constant-time check of `password` against a stored hash.
    ///
    /// Fails closed: an unrecognised or corrupted hash yields `false`.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        verify(password, password_hash).unwrap_or(false)
    }
}

/// Hash a password using bcrypt at the default cost
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    PasswordHasher::default().hash(password)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    PasswordHasher::default().verify(password, password_hash)
}
