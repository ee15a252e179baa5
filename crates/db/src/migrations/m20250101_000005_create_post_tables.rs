//! Create post, like, save and tag tables.
//!
//! These belong to the post store; they are created here so the graph and
//! recommendation services can run standalone.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Post::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Post::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Post::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Post::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Post::Description).text())
                    .col(ColumnDef::new(Post::CoverUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Post::Visibility)
                            .string_len(16)
                            .not_null()
                            .default("public"),
                    )
                    .col(ColumnDef::new(Post::DocumentId).big_integer())
                    .col(ColumnDef::new(Post::LikeCount).big_integer().not_null().default(0))
                    .col(
                        ColumnDef::new(Post::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_author")
                            .from(Post::Table, Post::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (like_count, created_at) for the popularity fallback
        manager
            .create_index(
                Index::create()
                    .name("idx_post_popularity")
                    .table(Post::Table)
                    .col((Post::LikeCount, IndexOrder::Desc))
                    .col((Post::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_document_id")
                    .table(Post::Table)
                    .col(Post::DocumentId)
                    .to_owned(),
            )
            .await?;

        for (table, fk_user, fk_post) in [
            (PostLike::Table, "fk_post_like_user", "fk_post_like_post"),
            (PostLike::SaveTable, "fk_post_save_user", "fk_post_save_post"),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(ColumnDef::new(PostLike::UserId).big_integer().not_null())
                        .col(ColumnDef::new(PostLike::PostId).big_integer().not_null())
                        .col(
                            ColumnDef::new(PostLike::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .primary_key(Index::create().col(PostLike::UserId).col(PostLike::PostId))
                        .foreign_key(
                            ForeignKey::create()
                                .name(fk_user)
                                .from(table, PostLike::UserId)
                                .to(User::Table, User::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(fk_post)
                                .from(table, PostLike::PostId)
                                .to(Post::Table, Post::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;
        }

        // Index: (user_id, created_at) to find the latest like quickly
        manager
            .create_index(
                Index::create()
                    .name("idx_post_like_user_created")
                    .table(PostLike::Table)
                    .col(PostLike::UserId)
                    .col((PostLike::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tag::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tag::Name).string_len(128).not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTag::PostId).big_integer().not_null())
                    .col(ColumnDef::new(PostTag::TagId).big_integer().not_null())
                    .primary_key(Index::create().col(PostTag::PostId).col(PostTag::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_post")
                            .from(PostTag::Table, PostTag::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_tag_tag")
                            .from(PostTag::Table, PostTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLike::SaveTable).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLike::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Post::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Post {
    Table,
    Id,
    AuthorId,
    Title,
    Description,
    CoverUrl,
    Visibility,
    DocumentId,
    LikeCount,
    CreatedAt,
}

/// `post_like` and `post_save` share one column layout.
#[derive(Iden, Clone, Copy)]
enum PostLike {
    Table,
    #[iden = "post_save"]
    SaveTable,
    UserId,
    PostId,
    CreatedAt,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum PostTag {
    Table,
    PostId,
    TagId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
