//! Account aggregate and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cpf::Cpf;
use crate::password::Password;
use crate::role::RoleSet;

/// Account aggregate.
///
/// Invariants:
/// - `deleted_at.is_none()` means the account is active.
/// - `complete` is only true when both `full_name` and `birth_date` are set.
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub cpf: Cpf,
    pub full_name: Option<String>,
    pub email: String,
    pub password: Password,
    pub birth_date: Option<NaiveDate>,
    pub complete: bool,
    pub roles: RoleSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft delete timestamp (None = active, Some = deleted)
    pub deleted_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("cpf", &self.cpf)
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("password", &"[PROTECTED]")
            .field("birth_date", &self.birth_date)
            .field("complete", &self.complete)
            .field("roles", &self.roles)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("deleted_at", &self.deleted_at)
            .finish()
    }
}

impl Account {
    /// Fully registered account: complete, real credential.
    pub fn register(
        id: Uuid,
        data: NewAccountProfile,
        password: Password,
        roles: RoleSet,
        now: DateTime<Utc>,
    ) -> Self {
        let mut account = Self {
            id,
            cpf: data.cpf,
            full_name: Some(data.full_name),
            email: data.email,
            password,
            birth_date: Some(data.birth_date),
            complete: false,
            roles,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        account.refresh_completeness();
        account
    }

    /// Partial account pushed by an internal system.
    ///
    /// Carries the caller's id and creation time and a placeholder credential,
    /// so it cannot be logged into until a real secret is set.
    pub fn synced(data: SyncAccount, placeholder: Password, roles: RoleSet, now: DateTime<Utc>) -> Self {
        let mut account = Self {
            id: data.id,
            cpf: data.cpf,
            full_name: data.full_name.filter(|n| !n.trim().is_empty()),
            email: data.email,
            password: placeholder,
            birth_date: None,
            complete: false,
            roles,
            created_at: data.created_at,
            updated_at: now,
            deleted_at: None,
        };
        account.refresh_completeness();
        account
    }

    /// Check if account is active (not deleted)
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }

    /// Check if account is soft deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Apply a partial profile update. Blank or absent fields are ignored.
    ///
    /// Returns whether anything changed.
    pub fn apply_update(&mut self, update: &AccountUpdate, now: DateTime<Utc>) -> bool {
        let mut changed = false;

        if let Some(name) = update.full_name.as_deref().map(str::trim) {
            if !name.is_empty() {
                self.full_name = Some(name.to_string());
                changed = true;
            }
        }

        if let Some(birth_date) = update.birth_date {
            self.birth_date = Some(birth_date);
            changed = true;
        }

        if changed {
            self.refresh_completeness();
            self.updated_at = now;
        }
        changed
    }

    /// Replace the credential hash
    pub fn set_password(&mut self, password: Password, now: DateTime<Utc>) {
        self.password = password;
        self.updated_at = now;
    }

    /// Soft delete. The first deletion instant is kept on repeated calls.
    pub fn mark_deleted(&mut self, now: DateTime<Utc>) {
        if self.deleted_at.is_none() {
            self.deleted_at = Some(now);
            self.updated_at = now;
        }
    }

    fn refresh_completeness(&mut self) {
        let has_name = self
            .full_name
            .as_deref()
            .is_some_and(|n| !n.trim().is_empty());
        self.complete = has_name && self.birth_date.is_some();
    }
}

/// Profile fields required to register an account.
#[derive(Debug, Clone)]
pub struct NewAccountProfile {
    pub cpf: Cpf,
    pub full_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
}

/// Registration input. The secret never leaves the registration path.
#[derive(Clone)]
pub struct NewAccount {
    pub profile: NewAccountProfile,
    pub password: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("profile", &self.profile)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Partial account pushed by an internal system.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncAccount {
    pub id: Uuid,
    pub cpf: Cpf,
    pub full_name: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Partial profile update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub full_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

/// Account response (safe to return to client). Has no credential field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AccountResponse {
    /// Unique account identifier
    pub id: Uuid,
    /// Role names held by the account
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub roles: RoleSet,
    /// CPF digits
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "52998224725"))]
    pub cpf: Cpf,
    /// Full name
    pub full_name: Option<String>,
    /// Email address
    pub email: String,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
    /// Whether name and birth date are both filled in
    pub complete: bool,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            roles: account.roles.clone(),
            cpf: account.cpf.clone(),
            full_name: account.full_name.clone(),
            email: account.email.clone(),
            birth_date: account.birth_date,
            complete: account.complete,
            created_at: account.created_at,
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            roles: account.roles,
            cpf: account.cpf,
            full_name: account.full_name,
            email: account.email,
            birth_date: account.birth_date,
            complete: account.complete,
            created_at: account.created_at,
        }
    }
}
