//! Infrastructure layer - database and external services.

mod db;
pub mod migrations;
mod notifier;

pub use db::{Database, HealthCheck};
pub use migrations::Migrator;
pub use notifier::{LogNotifier, RecoveryNotifier};

#[cfg(any(test, feature = "test-utils"))]
pub use db::MockHealthCheck;
#[cfg(any(test, feature = "test-utils"))]
pub use notifier::MockRecoveryNotifier;
