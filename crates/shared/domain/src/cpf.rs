//! CPF value object - the national identifier of an account.
//!
//! A `Cpf` can only be obtained through [`Cpf::parse`], so holding one is
//! proof that the two check digits were verified. Conversions from strings
//! and serde deserialization all go through the same entry point.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::CPF_LENGTH;
use crate::error::{DomainError, DomainResult};

/// Validated 11-digit CPF, stored without punctuation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cpf(String);

impl Cpf {
    /// Validate `raw` and wrap it.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidIdentifier` carrying the raw input when the
    /// length, character set, repeated-digit rule or either check digit fails.
    pub fn parse(raw: impl Into<String>) -> DomainResult<Self> {
        let raw = raw.into();
        match digits(&raw) {
            Some(d) if !is_repeated(&d) && check_digits_match(&d) => Ok(Self(raw)),
            _ => Err(DomainError::InvalidIdentifier(raw)),
        }
    }

    /// Raw digits, as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form `XXX.XXX.XXX-XX`.
    pub fn formatted(&self) -> String {
        let c = &self.0;
        format!("{}.{}.{}-{}", &c[0..3], &c[3..6], &c[6..9], &c[9..11])
    }
}

/// Digit values of `raw`, or `None` when it is not exactly 11 ASCII digits.
fn digits(raw: &str) -> Option<[u32; CPF_LENGTH]> {
    if raw.len() != CPF_LENGTH {
        return None;
    }
    let mut out = [0u32; CPF_LENGTH];
    for (slot, ch) in out.iter_mut().zip(raw.chars()) {
        *slot = ch.to_digit(10)?;
    }
    Some(out)
}

/// "00000000000" .. "99999999999" pass the arithmetic but are never issued.
fn is_repeated(d: &[u32; CPF_LENGTH]) -> bool {
    d.iter().all(|&x| x == d[0])
}

fn check_digits_match(d: &[u32; CPF_LENGTH]) -> bool {
    check_digit(&d[..9], 10) == d[9] && check_digit(&d[..10], 11) == d[10]
}

/// Weighted sum with weights descending from `first_weight` to 2, then
/// `11 - sum % 11`, where 10 and 11 collapse to 0.
fn check_digit(d: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = d
        .iter()
        .zip((2..=first_weight).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    match 11 - (sum % 11) {
        10 | 11 => 0,
        r => r,
    }
}

impl TryFrom<String> for Cpf {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cpf::parse(value)
    }
}

impl FromStr for Cpf {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cpf::parse(s)
    }
}

impl From<Cpf> for String {
    fn from(cpf: Cpf) -> Self {
        cpf.0
    }
}

impl AsRef<str> for Cpf {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
