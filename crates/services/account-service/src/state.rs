//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::HealthCheck;
use crate::service::{AccountService, AuthService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub account_service: Arc<dyn AccountService>,
    pub auth_service: Arc<dyn AuthService>,
    pub health: Arc<dyn HealthCheck>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        account_service: Arc<dyn AccountService>,
        auth_service: Arc<dyn AuthService>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        Self {
            account_service,
            auth_service,
            health,
        }
    }
}
