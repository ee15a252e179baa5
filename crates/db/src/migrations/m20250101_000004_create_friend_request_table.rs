//! Create friend request table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FriendRequest::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendRequest::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FriendRequest::RequesterId).big_integer().not_null())
                    .col(ColumnDef::new(FriendRequest::AddresseeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(FriendRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(FriendRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(FriendRequest::DecidedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_requester")
                            .from(FriendRequest::Table, FriendRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friend_request_addressee")
                            .from(FriendRequest::Table, FriendRequest::AddresseeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE friend_request
                ADD CONSTRAINT chk_friend_request_no_self
                CHECK (requester_id <> addressee_id);
                ",
            )
            .await?;

        // At most one pending request per unordered pair. Decided rows are
        // history and are not constrained.
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_friend_request_pending_pair
                ON friend_request (
                    LEAST(requester_id, addressee_id),
                    GREATEST(requester_id, addressee_id)
                )
                WHERE status = 'pending';
                ",
            )
            .await?;

        // Index: (addressee_id, status, created_at) for incoming listings
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_addressee")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::AddresseeId)
                    .col(FriendRequest::Status)
                    .col(FriendRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (requester_id, status, created_at) for outgoing listings
        manager
            .create_index(
                Index::create()
                    .name("idx_friend_request_requester")
                    .table(FriendRequest::Table)
                    .col(FriendRequest::RequesterId)
                    .col(FriendRequest::Status)
                    .col(FriendRequest::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum FriendRequest {
    Table,
    Id,
    RequesterId,
    AddresseeId,
    Status,
    CreatedAt,
    DecidedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
