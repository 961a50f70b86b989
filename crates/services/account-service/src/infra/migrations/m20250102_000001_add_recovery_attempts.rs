//! Migration: Count wrong recovery code guesses.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(PasswordRecoveries::Table)
                    .add_column(
                        ColumnDef::new(PasswordRecoveries::Attempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(PasswordRecoveries::Table)
                    .drop_column(PasswordRecoveries::Attempts)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum PasswordRecoveries {
    Table,
    Attempts,
}
