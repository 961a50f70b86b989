//! Account database entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub cpf: String,
    pub fullname: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub birth_date: Option<Date>,
    pub complete: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    /// Soft delete timestamp (NULL = active, set = deleted)
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRole,
    #[sea_orm(has_one = "super::password_recovery::Entity")]
    PasswordRecovery,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRole.def()
    }
}

impl Related<super::password_recovery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordRecovery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
