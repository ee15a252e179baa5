//! Create document feature table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentFeature::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentFeature::DocumentId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DocumentFeature::Status)
                            .string_len(16)
                            .not_null()
                            .default("queued"),
                    )
                    .col(ColumnDef::new(DocumentFeature::StyleLabel).string_len(128))
                    .col(ColumnDef::new(DocumentFeature::StyleVector).json_binary())
                    .col(ColumnDef::new(DocumentFeature::ClusterId).integer())
                    .col(ColumnDef::new(DocumentFeature::ErrorMessage).text())
                    .col(
                        ColumnDef::new(DocumentFeature::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(DocumentFeature::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Candidate lookup only touches finished rows of one label
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_document_feature_done_label
                ON document_feature (style_label)
                WHERE status = 'done' AND style_vector IS NOT NULL;
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentFeature::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum DocumentFeature {
    Table,
    DocumentId,
    Status,
    StyleLabel,
    StyleVector,
    ClusterId,
    ErrorMessage,
    CreatedAt,
    UpdatedAt,
}
