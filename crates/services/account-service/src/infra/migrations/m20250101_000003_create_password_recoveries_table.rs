//! Migration: Create password recoveries table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PasswordRecoveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordRecoveries::AccountId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PasswordRecoveries::CodeHash).string_len(255).not_null())
                    .col(ColumnDef::new(PasswordRecoveries::TokenHash).string_len(255).null())
                    .col(
                        ColumnDef::new(PasswordRecoveries::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordRecoveries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_password_recoveries_user")
                            .from(PasswordRecoveries::Table, PasswordRecoveries::AccountId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordRecoveries::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PasswordRecoveries {
    Table,
    AccountId,
    CodeHash,
    TokenHash,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
