//! In-memory stores and wiring shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::DbErr;
use uuid::Uuid;

use account_service_lib::infra::{HealthCheck, RecoveryNotifier};
use account_service_lib::repository::{AccountRepository, RecoveryRepository, RoleRepository};
use account_service_lib::routes::create_router;
use account_service_lib::service::{AccountManager, Authenticator, TokenIssuer};
use account_service_lib::state::AppState;
use common::{AppError, AppResult};
use domain::{
    Account, Cpf, NewAccount, NewAccountProfile, PasswordRecovery, Requester, Role, RoleSet,
    SyncAccount, ROLE_ADMIN, ROLE_USER,
};

pub const PRIVATE_KEY: &str = include_str!("../fixtures/private_key.pem");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/public_key.pem");

pub const CPF: &str = "52998224725";
pub const OTHER_CPF: &str = "11144477735";
pub const PASSWORD: &str = "correct horse";

// =============================================================================
// Account store
// =============================================================================

/// Account store keeping every row, deleted ones included, with the same
/// uniqueness rules as the database indexes.
#[derive(Default)]
pub struct InMemoryAccounts {
    rows: Mutex<HashMap<Uuid, Account>>,
}

impl InMemoryAccounts {
    /// Row by id regardless of deletion state
    pub fn raw(&self, id: Uuid) -> Option<Account> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    fn find_active(&self, pred: impl Fn(&Account) -> bool) -> Option<Account> {
        self.rows
            .lock()
            .unwrap()
            .values()
            .find(|a| a.is_active() && pred(a))
            .cloned()
    }

    fn any(&self, pred: impl Fn(&Account) -> bool) -> bool {
        self.rows.lock().unwrap().values().any(pred)
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        Ok(self.find_active(|a| a.email == email))
    }

    async fn find_active_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.find_active(|a| a.id == id))
    }

    async fn find_active_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<Account>> {
        Ok(self.find_active(|a| &a.cpf == cpf))
    }

    async fn list_active(&self) -> AppResult<Vec<Account>> {
        let mut accounts: Vec<Account> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_at);
        Ok(accounts)
    }

    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool> {
        Ok(self.any(|a| &a.cpf == cpf))
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        Ok(self.any(|a| a.email == email))
    }

    async fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.any(|a| a.id == id))
    }

    async fn insert(&self, account: &Account) -> AppResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        if rows.values().any(|a| a.cpf == account.cpf) {
            return Err(AppError::IdentifierConflict);
        }
        if rows.values().any(|a| a.email == account.email) {
            return Err(AppError::EmailConflict);
        }
        if rows.contains_key(&account.id) {
            return Err(AppError::id_in_use(account.id));
        }
        rows.insert(account.id, account.clone());
        Ok(account.clone())
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&account.id) {
            Some(row) => {
                *row = account.clone();
                Ok(account.clone())
            }
            None => Err(AppError::not_found("Account")),
        }
    }

    async fn delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.get_mut(&id).ok_or_else(|| AppError::not_found("Account"))?;
        row.mark_deleted(at);
        Ok(())
    }
}

// =============================================================================
// Role and recovery stores
// =============================================================================

/// Both seeded roles
pub struct SeededRoles;

#[async_trait]
impl RoleRepository for SeededRoles {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let role = match name {
            ROLE_USER => Some(Role { id: 1, name: ROLE_USER.to_string() }),
            ROLE_ADMIN => Some(Role { id: 2, name: ROLE_ADMIN.to_string() }),
            _ => None,
        };
        Ok(role)
    }
}

#[derive(Default)]
pub struct InMemoryRecoveries {
    rows: Mutex<HashMap<Uuid, PasswordRecovery>>,
}

impl InMemoryRecoveries {
    pub fn get(&self, account_id: Uuid) -> Option<PasswordRecovery> {
        self.rows.lock().unwrap().get(&account_id).cloned()
    }

    /// Push the expiry of a pending recovery into the past
    pub fn expire(&self, account_id: Uuid) {
        if let Some(recovery) = self.rows.lock().unwrap().get_mut(&account_id) {
            recovery.expires_at = Utc::now() - Duration::minutes(1);
        }
    }
}

#[async_trait]
impl RecoveryRepository for InMemoryRecoveries {
    async fn save(&self, recovery: &PasswordRecovery) -> AppResult<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(recovery.account_id, recovery.clone());
        Ok(())
    }

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<PasswordRecovery>> {
        Ok(self.get(account_id))
    }

    async fn delete(&self, account_id: Uuid) -> AppResult<()> {
        self.rows.lock().unwrap().remove(&account_id);
        Ok(())
    }
}

/// Keeps every delivered code so tests can read them back.
#[derive(Default)]
pub struct CapturingNotifier {
    sent: Mutex<Vec<(Uuid, String)>>,
}

impl CapturingNotifier {
    pub fn last_code(&self, account_id: Uuid) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(id, _)| *id == account_id)
            .map(|(_, code)| code.clone())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl RecoveryNotifier for CapturingNotifier {
    async fn send_code(&self, account: &Account, code: &str, _expires_at: DateTime<Utc>) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((account.id, code.to_string()));
        Ok(())
    }
}

/// Health check with a fixed answer
pub struct StaticHealth(pub bool);

#[async_trait]
impl HealthCheck for StaticHealth {
    async fn ping(&self) -> Result<(), DbErr> {
        if self.0 {
            Ok(())
        } else {
            Err(DbErr::Custom("connection refused".to_string()))
        }
    }
}

// =============================================================================
// Wiring
// =============================================================================

pub struct TestContext {
    pub accounts: Arc<InMemoryAccounts>,
    pub recoveries: Arc<InMemoryRecoveries>,
    pub notifier: Arc<CapturingNotifier>,
    pub account_service: Arc<AccountManager>,
    pub auth_service: Arc<Authenticator>,
}

impl TestContext {
    pub fn new() -> Self {
        let accounts = Arc::new(InMemoryAccounts::default());
        let recoveries = Arc::new(InMemoryRecoveries::default());
        let notifier = Arc::new(CapturingNotifier::default());

        let account_service = Arc::new(AccountManager::new(accounts.clone(), Arc::new(SeededRoles)));
        let auth_service = Arc::new(
            Authenticator::new(
                accounts.clone(),
                recoveries.clone(),
                notifier.clone(),
                TokenIssuer::from_pem(PRIVATE_KEY, 3_600_000).unwrap(),
                Duration::minutes(15),
            )
            .unwrap(),
        );

        Self {
            accounts,
            recoveries,
            notifier,
            account_service,
            auth_service,
        }
    }

    pub fn router(&self) -> Router {
        self.router_with_health(true)
    }

    pub fn router_with_health(&self, healthy: bool) -> Router {
        create_router(AppState::new(
            self.account_service.clone(),
            self.auth_service.clone(),
            Arc::new(StaticHealth(healthy)),
        ))
    }

    /// Give an existing account the admin role
    pub fn promote(&self, id: Uuid) {
        let mut account = self.accounts.raw(id).unwrap();
        account.roles.insert(ROLE_ADMIN);
        let mut rows = self.accounts.rows.lock().unwrap();
        rows.insert(id, account);
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn cpf(raw: &str) -> Cpf {
    Cpf::parse(raw).unwrap()
}

pub fn new_account(cpf_raw: &str, email: &str) -> NewAccount {
    NewAccount {
        profile: NewAccountProfile {
            cpf: cpf(cpf_raw),
            full_name: "Maria Silva".to_string(),
            email: email.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        },
        password: PASSWORD.to_string(),
    }
}

pub fn sync_account(id: Uuid, cpf_raw: &str, email: &str, full_name: Option<&str>) -> SyncAccount {
    SyncAccount {
        id,
        cpf: cpf(cpf_raw),
        full_name: full_name.map(str::to_string),
        email: email.to_string(),
        created_at: Utc::now() - Duration::days(3),
    }
}

pub fn as_self(account: &Account) -> Requester {
    Requester::new(account.id, account.roles.clone())
}

pub fn as_stranger() -> Requester {
    Requester::new(Uuid::new_v4(), [ROLE_USER].into_iter().collect::<RoleSet>())
}

pub fn as_admin() -> Requester {
    Requester::new(Uuid::new_v4(), [ROLE_USER, ROLE_ADMIN].into_iter().collect::<RoleSet>())
}
