//! Password recovery state, kept per account with an explicit expiry.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::constants::{MAX_RECOVERY_ATTEMPTS, RECOVERY_CODE_DIGITS};
use crate::error::{DomainError, DomainResult};
use crate::password::Password;

/// Pending recovery for one account.
///
/// Holds hashes only: the code sent to the user, and once the code has been
/// verified, the reset token handed back in exchange. A code is spent by its
/// first successful verification; `attempts` counts wrong guesses.
#[derive(Debug, Clone)]
pub struct PasswordRecovery {
    pub account_id: Uuid,
    pub code: Password,
    pub reset_token: Option<Password>,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordRecovery {
    /// Start a recovery. Returns the record to store and the plain code to
    /// deliver.
    pub fn issue(account_id: Uuid, now: DateTime<Utc>, ttl: Duration) -> DomainResult<(Self, String)> {
        let code = generate_code();
        let recovery = Self {
            account_id,
            code: Password::hash_secret(&code)?,
            reset_token: None,
            attempts: 0,
            expires_at: now + ttl,
            created_at: now,
        };
        Ok((recovery, code))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// No further code guesses are accepted.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_RECOVERY_ATTEMPTS
    }

    /// Exchange a matching, unexpired, unspent code for a reset token.
    ///
    /// A mismatch increments `attempts`. The returned plain token is only
    /// handed to the caller; the record keeps its hash and a fresh expiry.
    pub fn redeem_code(&mut self, code: &str, now: DateTime<Utc>, ttl: Duration) -> DomainResult<String> {
        if self.is_expired(now) || self.is_exhausted() || self.reset_token.is_some() {
            return Err(DomainError::InvalidRecovery);
        }
        if !self.code.verify(code) {
            self.attempts += 1;
            return Err(DomainError::InvalidRecovery);
        }
        let token = Uuid::new_v4().to_string();
        self.reset_token = Some(Password::hash_secret(&token)?);
        self.expires_at = now + ttl;
        Ok(token)
    }

    /// Check a reset token against the stored hash.
    pub fn check_token(&self, token: &str, now: DateTime<Utc>) -> DomainResult<()> {
        match &self.reset_token {
            Some(hash) if !self.is_expired(now) && hash.verify(token) => Ok(()),
            _ => Err(DomainError::InvalidRecovery),
        }
    }
}

/// Zero-padded numeric code with `RECOVERY_CODE_DIGITS` digits.
fn generate_code() -> String {
    let modulus = 10u32.pow(RECOVERY_CODE_DIGITS);
    let value = OsRng.next_u32() % modulus;
    format!("{:0width$}", value, width = RECOVERY_CODE_DIGITS as usize)
}
