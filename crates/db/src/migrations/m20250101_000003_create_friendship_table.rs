//! Create friendship table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Friendship::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Friendship::UserLowId).big_integer().not_null())
                    .col(ColumnDef::new(Friendship::UserHighId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Friendship::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(Friendship::UserLowId)
                            .col(Friendship::UserHighId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_user_low")
                            .from(Friendship::Table, Friendship::UserLowId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_friendship_user_high")
                            .from(Friendship::Table, Friendship::UserHighId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Canonical ordering makes the primary key cover the undirected pair
        manager
            .get_connection()
            .execute_unprepared(
                r"
                ALTER TABLE friendship
                ADD CONSTRAINT chk_friendship_canonical
                CHECK (user_low_id < user_high_id);
                ",
            )
            .await?;

        // Index: user_high_id (friend lookups from the high side)
        manager
            .create_index(
                Index::create()
                    .name("idx_friendship_user_high_id")
                    .table(Friendship::Table)
                    .col(Friendship::UserHighId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Friendship::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Friendship {
    Table,
    UserLowId,
    UserHighId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
