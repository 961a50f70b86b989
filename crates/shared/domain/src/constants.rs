//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Default role assigned to every new account
pub const ROLE_USER: &str = "ROLE_USER";

/// Administrator role, grants access to any account
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

/// Separator used when roles travel as a single header value
pub const ROLE_SEPARATOR: char = ',';

// =============================================================================
// Validation
// =============================================================================

/// Number of digits in a CPF
pub const CPF_LENGTH: usize = 11;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum stored length of a full name
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum stored length of an email address
pub const MAX_EMAIL_LENGTH: usize = 100;

// =============================================================================
// Authentication
// =============================================================================

/// Issuer claim written into every token
pub const TOKEN_ISSUER: &str = "servico-usuarios";

/// Default token lifetime in milliseconds (one hour)
pub const DEFAULT_TOKEN_TTL_MS: i64 = 3_600_000;

/// Milliseconds per second (for `expires_in` calculation)
pub const MILLIS_PER_SECOND: i64 = 1000;

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

// =============================================================================
// Password recovery
// =============================================================================

/// Number of digits in a recovery code
pub const RECOVERY_CODE_DIGITS: u32 = 6;

/// Default recovery code lifetime in minutes
pub const DEFAULT_RECOVERY_TTL_MINUTES: i64 = 15;

/// Wrong code guesses tolerated before a recovery is discarded
pub const MAX_RECOVERY_ATTEMPTS: i32 = 5;
