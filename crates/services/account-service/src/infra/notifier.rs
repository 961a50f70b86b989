//! Delivery seam for password recovery codes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::AppResult;
use domain::Account;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sends a freshly issued recovery code to the account holder.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecoveryNotifier: Send + Sync {
    async fn send_code(&self, account: &Account, code: &str, expires_at: DateTime<Utc>) -> AppResult<()>;
}

/// Records that a code was issued. The code itself is never written out.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl RecoveryNotifier for LogNotifier {
    async fn send_code(&self, account: &Account, _code: &str, expires_at: DateTime<Utc>) -> AppResult<()> {
        tracing::info!(
            account_id = %account.id,
            %expires_at,
            "recovery code issued; no delivery channel configured"
        );
        Ok(())
    }
}
