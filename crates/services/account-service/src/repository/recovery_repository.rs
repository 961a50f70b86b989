//! Password recovery store, one pending recovery per account.

use async_trait::async_trait;
use sea_orm::{sea_query::OnConflict, ActiveValue::Set, DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::entities::password_recovery;
use common::AppResult;
use domain::PasswordRecovery;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RecoveryRepository: Send + Sync {
    /// Insert or replace the recovery for its account
    async fn save(&self, recovery: &PasswordRecovery) -> AppResult<()>;

    /// Pending recovery for an account, expired or not
    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<PasswordRecovery>>;

    /// Drop the recovery for an account (no-op when absent)
    async fn delete(&self, account_id: Uuid) -> AppResult<()>;
}

/// SeaORM-backed recovery store
pub struct RecoveryStore {
    db: DatabaseConnection,
}

impl RecoveryStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecoveryRepository for RecoveryStore {
    async fn save(&self, recovery: &PasswordRecovery) -> AppResult<()> {
        let active = password_recovery::ActiveModel {
            account_id: Set(recovery.account_id),
            code_hash: Set(recovery.code.as_str().to_string()),
            token_hash: Set(recovery.reset_token.as_ref().map(|t| t.as_str().to_string())),
            attempts: Set(recovery.attempts),
            expires_at: Set(recovery.expires_at),
            created_at: Set(recovery.created_at),
        };

        password_recovery::Entity::insert(active)
            .on_conflict(
                OnConflict::column(password_recovery::Column::AccountId)
                    .update_columns([
                        password_recovery::Column::CodeHash,
                        password_recovery::Column::TokenHash,
                        password_recovery::Column::Attempts,
                        password_recovery::Column::ExpiresAt,
                        password_recovery::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<PasswordRecovery>> {
        let model = password_recovery::Entity::find_by_id(account_id)
            .one(&self.db)
            .await?;

        Ok(model.map(PasswordRecovery::from))
    }

    async fn delete(&self, account_id: Uuid) -> AppResult<()> {
        password_recovery::Entity::delete_by_id(account_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
