//! Account Service Library
//!
//! Identity validation, authentication and authorization for user accounts,
//! served over HTTP behind an upstream gateway.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::config::AccountServiceConfig;
use crate::infra::{Database, LogNotifier};
use crate::repository::{AccountStore, RecoveryStore, RoleStore};
use crate::routes::create_router;
use crate::service::{AccountManager, Authenticator, TokenIssuer};
use crate::state::AppState;

/// Run the HTTP server, loading configuration from the environment.
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = AccountServiceConfig::from_env()?;
    run_server_with_config(host, port, config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AccountServiceConfig::from_env_without_key();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Build the application state from live infrastructure.
///
/// The signing key is checked here, before the listener binds.
pub async fn build_state(config: &AccountServiceConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let tokens = TokenIssuer::from_pem(&config.jwt.private_key_pem, config.jwt.expiration_ms)?;

    let db = Database::connect(&config.database).await?;
    let conn = db.get_connection();

    let accounts = Arc::new(AccountStore::new(conn.clone()));
    let roles = Arc::new(RoleStore::new(conn.clone()));
    let recoveries = Arc::new(RecoveryStore::new(conn));

    let account_service = Arc::new(AccountManager::new(accounts.clone(), roles));
    let auth_service = Arc::new(Authenticator::new(
        accounts,
        recoveries,
        Arc::new(LogNotifier),
        tokens,
        Duration::minutes(config.recovery.code_ttl_minutes),
    )?);

    Ok(AppState::new(account_service, auth_service, Arc::new(db)))
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(
    host: &str,
    port: u16,
    config: AccountServiceConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state(&config).await?;
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(service = %config.service.service_name, "Account service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
