//! Create profiles table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Username).string_len(128))
                    .col(ColumnDef::new(Profiles::AvatarUrl).string_len(1024))
                    .col(ColumnDef::new(Profiles::IsModerator).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::IsTrusted).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::IsBanned).boolean().not_null().default(false))
                    .col(ColumnDef::new(Profiles::SuspendedUntil).date())
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (moderator user listing is newest-first)
        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_created_at")
                    .table(Profiles::Table)
                    .col(Profiles::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profiles {
    Table,
    Id,
    Username,
    AvatarUrl,
    IsModerator,
    IsTrusted,
    IsBanned,
    SuspendedUntil,
    CreatedAt,
}
