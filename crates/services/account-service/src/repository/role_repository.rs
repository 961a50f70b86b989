//! Role lookup.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use super::entities::role;
use common::AppResult;
use domain::Role;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Read-only access to role reference data.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find a role by its unique name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;
}

/// SeaORM-backed role store
pub struct RoleStore {
    db: DatabaseConnection,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let model = role::Entity::find()
            .filter(role::Column::Name.eq(name))
            .one(&self.db)
            .await?;

        Ok(model.map(Role::from))
    }
}
