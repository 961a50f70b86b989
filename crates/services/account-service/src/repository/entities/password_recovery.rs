//! Pending password recovery, one row per account.

use sea_orm::entity::prelude::*;

use domain::{Password, PasswordRecovery};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "password_recoveries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub account_id: Uuid,
    pub code_hash: String,
    pub token_hash: Option<String>,
    pub attempts: i32,
    pub expires_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AccountId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PasswordRecovery {
    fn from(model: Model) -> Self {
        PasswordRecovery {
            account_id: model.account_id,
            code: Password::from_hash(model.code_hash),
            reset_token: model.token_hash.map(Password::from_hash),
            attempts: model.attempts,
            expires_at: model.expires_at,
            created_at: model.created_at,
        }
    }
}
