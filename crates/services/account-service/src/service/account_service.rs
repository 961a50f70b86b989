//! Account service - account lifecycle and lookups.
//!
//! Protected operations consult the authorization policy before touching the
//! store. Uniqueness pre-checks give clear errors; the store's unique indexes
//! remain the final word under concurrent registration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    check_is_admin, Account, AccountUpdate, Cpf, NewAccount, Password, Requester, RoleSet,
    SyncAccount, ROLE_USER,
};

use crate::repository::{AccountRepository, RoleRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const ACCOUNT: &str = "Account";

/// Account service trait for dependency injection.
///
/// Lookups only ever return active accounts.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Get an active account (own account or admin)
    async fn get_account(&self, id: Uuid, requester: &Requester) -> AppResult<Account>;

    /// List all active accounts (admin only)
    async fn list_accounts(&self, requester_roles: &RoleSet) -> AppResult<Vec<Account>>;

    /// Find an active account by CPF, validating the input first
    async fn find_by_cpf(&self, cpf: &str) -> AppResult<Account>;

    /// Register a complete account with a real credential
    async fn register(&self, data: NewAccount) -> AppResult<Account>;

    /// Create a partial account pushed by an internal system
    async fn sync(&self, data: SyncAccount) -> AppResult<Account>;

    /// Update profile fields (own account or admin)
    async fn update_account(
        &self,
        id: Uuid,
        update: AccountUpdate,
        requester: &Requester,
    ) -> AppResult<Account>;

    /// Soft delete (own account or admin)
    async fn delete_account(&self, id: Uuid, requester: &Requester) -> AppResult<()>;
}

/// Concrete implementation of AccountService using repositories.
pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl AccountManager {
    /// Create new account service instance with repositories
    pub fn new(accounts: Arc<dyn AccountRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { accounts, roles }
    }

    /// CPF and email must be unused by any row, deleted ones included.
    async fn ensure_unique(&self, cpf: &Cpf, email: &str) -> AppResult<()> {
        if self.accounts.exists_by_cpf(cpf).await? {
            return Err(AppError::IdentifierConflict);
        }
        if self.accounts.exists_by_email(email).await? {
            return Err(AppError::EmailConflict);
        }
        Ok(())
    }

    async fn default_roles(&self) -> AppResult<RoleSet> {
        let role = self
            .roles
            .find_by_name(ROLE_USER)
            .await?
            .ok_or_else(|| AppError::internal(format!("role {} is not seeded", ROLE_USER)))?;
        Ok(RoleSet::from(&role))
    }
}

#[async_trait]
impl AccountService for AccountManager {
    async fn get_account(&self, id: Uuid, requester: &Requester) -> AppResult<Account> {
        requester.ensure_can_act_on(id)?;

        self.accounts
            .find_active_by_id(id)
            .await?
            .ok_or_not_found(ACCOUNT)
    }

    async fn list_accounts(&self, requester_roles: &RoleSet) -> AppResult<Vec<Account>> {
        check_is_admin(requester_roles)?;
        self.accounts.list_active().await
    }

    async fn find_by_cpf(&self, cpf: &str) -> AppResult<Account> {
        let cpf = Cpf::parse(cpf)?;

        self.accounts
            .find_active_by_cpf(&cpf)
            .await?
            .ok_or_not_found(ACCOUNT)
    }

    async fn register(&self, data: NewAccount) -> AppResult<Account> {
        let NewAccount { mut profile, password } = data;
        profile.full_name = profile.full_name.trim().to_string();
        if profile.full_name.is_empty() {
            return Err(AppError::validation("Full name must not be blank"));
        }
        self.ensure_unique(&profile.cpf, &profile.email).await?;

        let password = Password::new(&password)?;
        let roles = self.default_roles().await?;
        let account = Account::register(Uuid::new_v4(), profile, password, roles, Utc::now());

        let saved = self.accounts.insert(&account).await?;
        info!(account_id = %saved.id, "Account registered");
        Ok(saved)
    }

    async fn sync(&self, data: SyncAccount) -> AppResult<Account> {
        if self.accounts.exists_by_id(data.id).await? {
            return Err(AppError::id_in_use(data.id));
        }
        self.ensure_unique(&data.cpf, &data.email).await?;

        let now = Utc::now();
        let placeholder = Password::placeholder(now)?;
        let roles = self.default_roles().await?;
        let account = Account::synced(data, placeholder, roles, now);

        let saved = self.accounts.insert(&account).await?;
        info!(account_id = %saved.id, complete = saved.complete, "Account synced");
        Ok(saved)
    }

    async fn update_account(
        &self,
        id: Uuid,
        update: AccountUpdate,
        requester: &Requester,
    ) -> AppResult<Account> {
        requester.ensure_can_act_on(id)?;

        let mut account = self
            .accounts
            .find_active_by_id(id)
            .await?
            .ok_or_not_found(ACCOUNT)?;

        if !account.apply_update(&update, Utc::now()) {
            debug!(account_id = %id, "Update carried no changes");
            return Ok(account);
        }

        let saved = self.accounts.update(&account).await?;
        info!(account_id = %id, complete = saved.complete, "Account updated");
        Ok(saved)
    }

    async fn delete_account(&self, id: Uuid, requester: &Requester) -> AppResult<()> {
        requester.ensure_can_act_on(id)?;

        if !self.accounts.exists_by_id(id).await? {
            return Err(AppError::not_found(ACCOUNT));
        }

        self.accounts.delete(id, Utc::now()).await?;
        info!(account_id = %id, requested_by = %requester.id, "Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::{NewAccountProfile, Role, ROLE_ADMIN};

    use crate::repository::{MockAccountRepository, MockRoleRepository};

    fn cpf() -> Cpf {
        Cpf::parse("52998224725").unwrap()
    }

    fn profile() -> NewAccountProfile {
        NewAccountProfile {
            cpf: cpf(),
            full_name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        }
    }

    fn stored_account(id: Uuid) -> Account {
        Account::register(
            id,
            profile(),
            Password::from_hash("stored"),
            [ROLE_USER].into_iter().collect(),
            Utc::now(),
        )
    }

    fn user_role_store() -> MockRoleRepository {
        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_name().returning(|name| {
            Ok(Some(Role {
                id: 1,
                name: name.to_string(),
            }))
        });
        roles
    }

    fn requester(id: Uuid, roles: &[&str]) -> Requester {
        Requester::new(id, roles.iter().copied().collect())
    }

    #[tokio::test]
    async fn test_get_account_denied_before_store_access() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_active_by_id().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let err = service
            .get_account(Uuid::new_v4(), &requester(Uuid::new_v4(), &[ROLE_USER]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_admin_can_get_any_account() {
        let target = Uuid::new_v4();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_id()
            .returning(move |id| Ok(Some(stored_account(id))));

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let account = service
            .get_account(target, &requester(Uuid::new_v4(), &[ROLE_ADMIN]))
            .await
            .unwrap();

        assert_eq!(account.id, target);
    }

    #[tokio::test]
    async fn test_list_requires_admin() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_list_active().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let err = service.list_accounts(&RoleSet::new()).await.unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_find_by_cpf_rejects_invalid_input_without_lookup() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_active_by_cpf().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let err = service.find_by_cpf("11111111111").await.unwrap_err();

        assert!(matches!(err, AppError::InvalidIdentifier(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_cpf() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_cpf().returning(|_| Ok(true));
        accounts.expect_insert().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(user_role_store()));
        let err = service
            .register(NewAccount {
                profile: profile(),
                password: "long enough".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::IdentifierConflict));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_email() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_cpf().returning(|_| Ok(false));
        accounts.expect_exists_by_email().returning(|_| Ok(true));
        accounts.expect_insert().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(user_role_store()));
        let err = service
            .register(NewAccount {
                profile: profile(),
                password: "long enough".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmailConflict));
    }

    #[tokio::test]
    async fn test_register_hashes_secret_and_assigns_user_role() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_cpf().returning(|_| Ok(false));
        accounts.expect_exists_by_email().returning(|_| Ok(false));
        accounts
            .expect_insert()
            .withf(|a| {
                a.complete
                    && a.roles.contains(ROLE_USER)
                    && a.password.as_str() != "long enough"
                    && a.password.verify("long enough")
            })
            .times(1)
            .returning(|a| Ok(a.clone()));

        let service = AccountManager::new(Arc::new(accounts), Arc::new(user_role_store()));
        let account = service
            .register(NewAccount {
                profile: profile(),
                password: "long enough".to_string(),
            })
            .await
            .unwrap();

        assert!(account.is_active());
        assert_eq!(account.roles.len(), 1);
    }

    #[tokio::test]
    async fn test_sync_rejects_taken_id() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_id().returning(|_| Ok(true));
        accounts.expect_insert().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(user_role_store()));
        let err = service
            .sync(SyncAccount {
                id: Uuid::new_v4(),
                cpf: cpf(),
                full_name: None,
                email: "maria@example.com".to_string(),
                created_at: Utc::now(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_denied_for_other_user() {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_active_by_id().times(0);
        accounts.expect_update().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let err = service
            .update_account(
                Uuid::new_v4(),
                AccountUpdate::default(),
                &requester(Uuid::new_v4(), &[]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn test_blank_update_does_not_write() {
        let id = Uuid::new_v4();
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_active_by_id()
            .returning(move |id| Ok(Some(stored_account(id))));
        accounts.expect_update().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let update = AccountUpdate {
            full_name: Some("   ".to_string()),
            birth_date: None,
        };
        let account = service
            .update_account(id, update, &requester(id, &[ROLE_USER]))
            .await
            .unwrap();

        assert_eq!(account.full_name.as_deref(), Some("Maria Silva"));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let id = Uuid::new_v4();
        let mut accounts = MockAccountRepository::new();
        accounts.expect_exists_by_id().returning(|_| Ok(false));
        accounts.expect_delete().times(0);

        let service = AccountManager::new(Arc::new(accounts), Arc::new(MockRoleRepository::new()));
        let err = service
            .delete_account(id, &requester(id, &[ROLE_USER]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
