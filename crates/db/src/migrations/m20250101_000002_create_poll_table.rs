//! Create poll table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Poll::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Poll::CreatorId).string_len(32).not_null())
                    .col(ColumnDef::new(Poll::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Poll::Description).string_len(1000).not_null())
                    .col(
                        ColumnDef::new(Poll::IsMultipleChoice)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Poll::IsClosed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Poll::ClosingDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_creator")
                            .from(Poll::Table, Poll::CreatorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: creator_id (for listing a user's polls)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_creator_id")
                    .table(Poll::Table)
                    .col(Poll::CreatorId)
                    .to_owned(),
            )
            .await?;

        // Index: (is_closed, closing_date) - for the expiry sweep
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_closed_closing_date")
                    .table(Poll::Table)
                    .col(Poll::IsClosed)
                    .col(Poll::ClosingDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    CreatorId,
    Title,
    Description,
    IsMultipleChoice,
    IsClosed,
    ClosingDate,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
