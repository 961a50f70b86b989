//! Account repository implementation with soft delete support.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait,
    ActiveValue::{Set, Unchanged},
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use super::entities::{role, user, user_role};
use common::{AppError, AppResult};
use domain::{Account, Cpf, Password, RoleSet};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account store.
///
/// `find_active_*` and `list_active` only see accounts whose `deleted_at` is
/// unset. `exists_*` checks look at every row, deleted or not, so identifiers
/// and emails are never reused.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find active account by email address
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Find active account by ID
    async fn find_active_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find active account by CPF
    async fn find_active_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<Account>>;

    /// List all active accounts
    async fn list_active(&self) -> AppResult<Vec<Account>>;

    /// Whether any row (active or deleted) holds this CPF
    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool>;

    /// Whether any row (active or deleted) holds this email
    async fn exists_by_email(&self, email: &str) -> AppResult<bool>;

    /// Whether any row (active or deleted) has this ID
    async fn exists_by_id(&self, id: Uuid) -> AppResult<bool>;

    /// Persist a new account with its role links.
    ///
    /// Unique-constraint violations surface as `IdentifierConflict`,
    /// `EmailConflict`, or a validation error for a taken id; this is the
    /// authoritative uniqueness gate.
    async fn insert(&self, account: &Account) -> AppResult<Account>;

    /// Persist changed account fields (roles are not touched)
    async fn update(&self, account: &Account) -> AppResult<Account>;

    /// Soft delete: marks the row deleted at `at` and keeps it
    async fn delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// SeaORM-backed account store
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Role names per account, loaded with one join query.
    async fn load_roles<C: ConnectionTrait>(
        conn: &C,
        ids: Vec<Uuid>,
    ) -> AppResult<HashMap<Uuid, RoleSet>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = user_role::Entity::find()
            .filter(user_role::Column::UserId.is_in(ids))
            .find_also_related(role::Entity)
            .all(conn)
            .await?;

        let mut roles: HashMap<Uuid, RoleSet> = HashMap::new();
        for (link, role) in rows {
            if let Some(role) = role {
                roles.entry(link.user_id).or_default().insert(role.name);
            }
        }
        Ok(roles)
    }

    async fn hydrate(&self, models: Vec<user::Model>) -> AppResult<Vec<Account>> {
        let ids = models.iter().map(|m| m.id).collect();
        let mut roles = Self::load_roles(&self.db, ids).await?;

        models
            .into_iter()
            .map(|model| {
                let account_roles = roles.remove(&model.id).unwrap_or_default();
                to_account(model, account_roles)
            })
            .collect()
    }

    async fn hydrate_one(&self, model: Option<user::Model>) -> AppResult<Option<Account>> {
        match model {
            Some(model) => Ok(self.hydrate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        self.hydrate_one(model).await
    }

    async fn find_active_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let model = user::Entity::find_by_id(id)
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        self.hydrate_one(model).await
    }

    async fn find_active_by_cpf(&self, cpf: &Cpf) -> AppResult<Option<Account>> {
        let model = user::Entity::find()
            .filter(user::Column::Cpf.eq(cpf.as_str()))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        self.hydrate_one(model).await
    }

    async fn list_active(&self) -> AppResult<Vec<Account>> {
        let models = user::Entity::find()
            .filter(user::Column::DeletedAt.is_null())
            .all(&self.db)
            .await?;

        self.hydrate(models).await
    }

    async fn exists_by_cpf(&self, cpf: &Cpf) -> AppResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Cpf.eq(cpf.as_str()))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        let count = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        let count = user::Entity::find_by_id(id).count(&self.db).await?;
        Ok(count > 0)
    }

    async fn insert(&self, account: &Account) -> AppResult<Account> {
        let txn = self.db.begin().await?;

        let model = to_active_model(account)
            .insert(&txn)
            .await
            .map_err(|e| map_write_error(e, account.id))?;

        let names: Vec<String> = account.roles.to_vec();
        if !names.is_empty() {
            let roles = role::Entity::find()
                .filter(role::Column::Name.is_in(names.clone()))
                .all(&txn)
                .await?;
            if roles.len() != names.len() {
                return Err(AppError::internal(format!(
                    "unknown role in {:?} for account {}",
                    names, account.id
                )));
            }

            let links = roles.into_iter().map(|r| user_role::ActiveModel {
                user_id: Set(model.id),
                role_id: Set(r.id),
            });
            user_role::Entity::insert_many(links)
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        to_account(model, account.roles.clone())
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let mut active = to_active_model(account);
        active.id = Unchanged(account.id);
        active.created_at = Unchanged(account.created_at);

        let model = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::not_found("Account"),
            other => map_write_error(other, account.id),
        })?;

        to_account(model, account.roles.clone())
    }

    async fn delete(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        let mut account = self
            .hydrate_one(model)
            .await?
            .ok_or_else(|| AppError::not_found("Account"))?;

        account.mark_deleted(at);
        self.update(&account).await?;
        Ok(())
    }
}

fn to_active_model(account: &Account) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(account.id),
        cpf: Set(account.cpf.as_str().to_string()),
        fullname: Set(account.full_name.clone()),
        email: Set(account.email.clone()),
        password: Set(account.password.as_str().to_string()),
        birth_date: Set(account.birth_date),
        complete: Set(account.complete),
        created_at: Set(account.created_at),
        updated_at: Set(account.updated_at),
        deleted_at: Set(account.deleted_at),
    }
}

/// Convert a row into the aggregate. The CPF is re-validated on the way in.
fn to_account(model: user::Model, roles: RoleSet) -> AppResult<Account> {
    let cpf = Cpf::parse(model.cpf)
        .map_err(|_| AppError::internal(format!("stored CPF of account {} is invalid", model.id)))?;

    Ok(Account {
        id: model.id,
        cpf,
        full_name: model.fullname,
        email: model.email,
        password: Password::from_hash(model.password),
        birth_date: model.birth_date,
        complete: model.complete,
        roles,
        created_at: model.created_at,
        updated_at: model.updated_at,
        deleted_at: model.deleted_at,
    })
}

/// Unique index names carry the column, e.g. `idx_users_cpf`.
fn map_write_error(err: DbErr, id: Uuid) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            unique_violation(&detail, id).unwrap_or_else(|| AppError::from(err))
        }
        _ => AppError::from(err),
    }
}

fn unique_violation(detail: &str, id: Uuid) -> Option<AppError> {
    if detail.contains("cpf") {
        Some(AppError::IdentifierConflict)
    } else if detail.contains("email") {
        Some(AppError::EmailConflict)
    } else if detail.contains("users_pkey") {
        Some(AppError::id_in_use(id))
    } else {
        None
    }
}
