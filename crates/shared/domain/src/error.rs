//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (HTTP, database).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Identifier failed length, format or check digit validation
    #[error("Invalid CPF: {0}")]
    InvalidIdentifier(String),

    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password-related errors
    #[error("Password error: {0}")]
    Password(String),

    /// Unknown email or wrong secret, deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Requester may not act on the target
    #[error("Access denied")]
    AccessDenied,

    /// Entity not found (or not active)
    #[error("Not found: {0}")]
    NotFound(String),

    /// CPF already registered, including soft-deleted accounts
    #[error("CPF already registered")]
    IdentifierConflict,

    /// Email already registered, including soft-deleted accounts
    #[error("Email already registered")]
    EmailConflict,

    /// Recovery code or token is wrong, missing or expired
    #[error("Invalid or expired recovery code")]
    InvalidRecovery,

    /// Unusable configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a password error
    pub fn password(msg: impl Into<String>) -> Self {
        DomainError::Password(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        DomainError::Configuration(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
