//! Account service configuration.

use std::env;

use common::{AppError, AppResult, DatabaseConfig, JwtConfig, RecoveryConfig, ServiceConfig};

/// Account service configuration.
#[derive(Debug, Clone, Default)]
pub struct AccountServiceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub recovery: RecoveryConfig,
}

impl AccountServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `AppError::Configuration` when no signing key is provided or
    /// the key file cannot be read. A missing key is fatal: the service
    /// cannot issue tokens without it.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::from_env_without_key();
        config.jwt.private_key_pem = load_private_key()?;
        Ok(config)
    }

    /// Everything except the signing key, for commands that never sign.
    pub fn from_env_without_key() -> Self {
        let defaults = Self::default();

        Self {
            service: ServiceConfig {
                service_name: defaults.service.service_name,
                host: env::var("ACCOUNT_SERVICE_HOST").unwrap_or(defaults.service.host),
                port: parse_var("ACCOUNT_SERVICE_PORT").unwrap_or(defaults.service.port),
            },
            database: DatabaseConfig {
                url: env::var("ACCOUNT_SERVICE_DATABASE_URL")
                    .or_else(|_| env::var("DATABASE_URL"))
                    .unwrap_or(defaults.database.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(defaults.database.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(defaults.database.min_connections),
            },
            jwt: JwtConfig {
                private_key_pem: String::new(),
                expiration_ms: parse_var("JWT_EXPIRATION_MS").unwrap_or(defaults.jwt.expiration_ms),
            },
            recovery: RecoveryConfig {
                code_ttl_minutes: parse_var("RECOVERY_CODE_TTL_MINUTES")
                    .unwrap_or(defaults.recovery.code_ttl_minutes),
            },
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// PEM from `JWT_PRIVATE_KEY`, or from the file named by `JWT_PRIVATE_KEY_PATH`.
///
/// Single-line values with literal `\n` sequences are accepted, since that is
/// how multi-line PEM usually survives `.env` files.
fn load_private_key() -> AppResult<String> {
    if let Ok(inline) = env::var("JWT_PRIVATE_KEY") {
        return Ok(inline.replace("\\n", "\n"));
    }

    let path = env::var("JWT_PRIVATE_KEY_PATH").map_err(|_| {
        AppError::configuration("JWT_PRIVATE_KEY or JWT_PRIVATE_KEY_PATH must be set")
    })?;

    std::fs::read_to_string(&path)
        .map_err(|e| AppError::configuration(format!("cannot read {}: {}", path, e)))
}
