//! Create poll vote table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PollVote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollVote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollVote::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(PollVote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(PollVote::OptionId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(PollVote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(PollVote::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_user")
                            .from(PollVote::Table, PollVote::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_poll")
                            .from(PollVote::Table, PollVote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_vote_option")
                            .from(PollVote::Table, PollVote::OptionId)
                            .to(PollOption::Table, PollOption::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, option_id) - one vote row per user per option
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_user_option")
                    .table(PollVote::Table)
                    .col(PollVote::UserId)
                    .col(PollVote::OptionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, poll_id) - for replacing a user's selection
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_user_poll")
                    .table(PollVote::Table)
                    .col(PollVote::UserId)
                    .col(PollVote::PollId)
                    .to_owned(),
            )
            .await?;

        // Index: poll_id (for tallying results)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_poll_id")
                    .table(PollVote::Table)
                    .col(PollVote::PollId)
                    .to_owned(),
            )
            .await?;

        // Index: option_id (for per-option counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_poll_vote_option_id")
                    .table(PollVote::Table)
                    .col(PollVote::OptionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollVote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PollVote {
    Table,
    Id,
    UserId,
    PollId,
    OptionId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

#[derive(Iden)]
enum PollOption {
    Table,
    Id,
}
