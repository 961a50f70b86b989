//! Password value object - credential hashing and verification.
//!
//! Plain text only ever passes through this module on its way to a hash;
//! nothing here stores or returns it.

use argon2::{
    password_hash::{
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use chrono::{DateTime, Utc};

use crate::constants::MIN_PASSWORD_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Hashed credential. Compared by hash, never by plain text.
#[derive(Clone, PartialEq, Eq)]
pub struct Password {
    hash: String,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Password")
            .field("hash", &"[REDACTED]")
            .finish()
    }
}

impl Password {
    /// Hash a user-chosen secret.
    ///
    /// # Errors
    /// Returns `DomainError::Password` if the secret is shorter than
    /// `MIN_PASSWORD_LENGTH` characters.
    pub fn new(plain_text: &str) -> DomainResult<Self> {
        if plain_text.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(DomainError::password(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        Self::hash_secret(plain_text)
    }

    /// Hash an arbitrary secret without the length rule (recovery codes,
    /// reset tokens).
    pub fn hash_secret(secret: &str) -> DomainResult<Self> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| DomainError::internal(format!("Password hash failed: {}", e)))?;
        Ok(Self {
            hash: hash.to_string(),
        })
    }

    /// Unusable credential for accounts created by sync.
    ///
    /// The hashed input mixes the creation instant with random bytes that are
    /// thrown away, so no caller can ever present the matching secret.
    pub fn placeholder(now: DateTime<Utc>) -> DomainResult<Self> {
        let mut noise = [0u8; 32];
        OsRng.fill_bytes(&mut noise);
        let seed: String = noise.iter().map(|b| format!("{:02x}", b)).collect();
        Self::hash_secret(&format!("{}:{}", now.timestamp_millis(), seed))
    }

    /// Wrap a hash loaded from storage.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }

    /// Get the hash string for storage.
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Consume and return the hash string.
    pub fn into_string(self) -> String {
        self.hash
    }

    /// Verify a plain text secret against this hash.
    ///
    /// Salt and cost parameters come from the stored PHC string. A hash that
    /// cannot be parsed never verifies.
    pub fn verify(&self, plain_text: &str) -> bool {
        match PasswordHash::new(&self.hash) {
            Ok(parsed) => Self::argon2()
                .verify_password(plain_text.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    #[inline]
    fn argon2() -> Argon2<'static> {
        Argon2::default()
    }
}

impl From<Password> for String {
    fn from(password: Password) -> Self {
        password.hash
    }
}
