//! Feature repository: liked-post seeds and recommendation candidates.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement, prelude::DateTimeWithTimeZone};
use serde_json::Value as JsonValue;
use sharegraph_common::{AppError, AppResult};

use crate::entities::document_feature::{STYLE_VECTOR_LEN, parse_style_vector};
use crate::entities::post::PostVisibility;
use crate::models::{CandidatePost, SeedPost};
use crate::store::FeatureReader;

/// Posts viewer `$1` may see: public ones, and friends-only ones whose
/// author is a friend of the viewer.
const VISIBLE_TO_VIEWER: &str = r"
    (
        p.visibility = 'public'
        OR (
            p.visibility = 'friends'
            AND EXISTS (
                SELECT 1 FROM friendship f
                WHERE f.user_low_id = LEAST($1, p.author_id)
                  AND f.user_high_id = GREATEST($1, p.author_id)
            )
        )
    )";

/// Display columns of a [`CandidatePost`] row, relative to viewer `$1`.
const CANDIDATE_COLUMNS: &str = r"
    p.id AS post_id,
    p.author_id AS author_id,
    p.title AS title,
    p.description AS description,
    p.cover_url AS cover_url,
    p.visibility AS visibility,
    u.username AS author_name,
    u.avatar_url AS author_avatar,
    p.like_count AS like_count,
    EXISTS (
        SELECT 1 FROM post_like l2 WHERE l2.user_id = $1 AND l2.post_id = p.id
    ) AS is_liked,
    EXISTS (
        SELECT 1 FROM post_save s2 WHERE s2.user_id = $1 AND s2.post_id = p.id
    ) AS is_saved,
    COALESCE(
        (SELECT jsonb_agg(t.name ORDER BY t.name)
         FROM post_tag pt JOIN tag t ON t.id = pt.tag_id
         WHERE pt.post_id = p.id),
        '[]'::jsonb
    ) AS tags,
    p.created_at AS created_at,
    df.style_vector AS style_vector";

#[derive(FromQueryResult)]
struct SeedRow {
    post_id: i64,
    style_label: String,
    style_vector: JsonValue,
}

#[derive(FromQueryResult)]
struct CandidateRow {
    post_id: i64,
    author_id: i64,
    title: String,
    description: Option<String>,
    cover_url: Option<String>,
    visibility: PostVisibility,
    author_name: String,
    author_avatar: Option<String>,
    like_count: i64,
    is_liked: bool,
    is_saved: bool,
    tags: JsonValue,
    created_at: DateTimeWithTimeZone,
    style_vector: Option<JsonValue>,
}

impl CandidateRow {
    fn into_candidate(self, vector: Vec<f64>) -> CandidatePost {
        let tags = self
            .tags
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        CandidatePost {
            post_id: self.post_id,
            author_id: self.author_id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            cover_url: self.cover_url.unwrap_or_default(),
            visibility: self.visibility,
            author_name: self.author_name,
            author_avatar: self.author_avatar.unwrap_or_default(),
            tags,
            like_count: self.like_count,
            is_liked: self.is_liked,
            is_saved: self.is_saved,
            created_at: self.created_at,
            vector,
        }
    }
}

/// Feature repository for database operations.
#[derive(Clone)]
pub struct FeatureRepository {
    db: Arc<DatabaseConnection>,
}

impl FeatureRepository {
    /// Create a new feature repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn query_candidates(
        &self,
        sql: &str,
        values: Vec<sea_orm::Value>,
    ) -> AppResult<Vec<CandidateRow>> {
        CandidateRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl FeatureReader for FeatureRepository {
    async fn latest_liked_seed(&self, user_id: i64) -> AppResult<Option<SeedPost>> {
        let row = SeedRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            SELECT p.id AS post_id,
                   df.style_label AS style_label,
                   df.style_vector AS style_vector
            FROM post_like l
            JOIN post p ON p.id = l.post_id
            JOIN document_feature df ON df.document_id = p.document_id
            WHERE l.user_id = $1
              AND df.status = 'done'
              AND df.style_label IS NOT NULL
              AND df.style_vector IS NOT NULL
            ORDER BY l.created_at DESC
            LIMIT 1
            ",
            [user_id.into()],
        ))
        .one(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map(|row| {
            let vector = parse_style_vector(&row.style_vector).unwrap_or_else(|| {
                tracing::warn!(post_id = row.post_id, "Seed style vector is not a numeric array");
                Vec::new()
            });
            if vector.len() != STYLE_VECTOR_LEN {
                tracing::debug!(
                    post_id = row.post_id,
                    len = vector.len(),
                    expected = STYLE_VECTOR_LEN,
                    "Seed style vector has unexpected length"
                );
            }
            SeedPost {
                post_id: row.post_id,
                label: row.style_label,
                vector,
            }
        }))
    }

    async fn list_candidates(
        &self,
        user_id: i64,
        exclude_post_id: i64,
        label: &str,
        limit: u64,
    ) -> AppResult<Vec<CandidatePost>> {
        let sql = format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM post p
            JOIN document_feature df ON df.document_id = p.document_id
            JOIN "user" u ON u.id = p.author_id
            WHERE df.status = 'done'
              AND df.style_label = $2
              AND df.style_vector IS NOT NULL
              AND p.id <> $3
              AND NOT EXISTS (
                  SELECT 1 FROM post_like l2 WHERE l2.user_id = $1 AND l2.post_id = p.id
              )
              AND {VISIBLE_TO_VIEWER}
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $4
            "#
        );
        let rows = self
            .query_candidates(
                &sql,
                vec![
                    user_id.into(),
                    label.into(),
                    exclude_post_id.into(),
                    i64::try_from(limit).unwrap_or(i64::MAX).into(),
                ],
            )
            .await?;

        // Rows whose vector does not decode are skipped
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let vector = row.style_vector.as_ref().and_then(parse_style_vector)?;
                Some(row.into_candidate(vector))
            })
            .collect())
    }

    async fn list_fallback(&self, user_id: i64, limit: u64) -> AppResult<Vec<CandidatePost>> {
        let sql = format!(
            r#"
            SELECT {CANDIDATE_COLUMNS}
            FROM post p
            LEFT JOIN document_feature df ON df.document_id = p.document_id
            JOIN "user" u ON u.id = p.author_id
            WHERE {VISIBLE_TO_VIEWER}
            ORDER BY p.like_count DESC, p.created_at DESC, p.id DESC
            LIMIT $2
            "#
        );
        let rows = self
            .query_candidates(
                &sql,
                vec![user_id.into(), i64::try_from(limit).unwrap_or(i64::MAX).into()],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let vector = row
                    .style_vector
                    .as_ref()
                    .and_then(parse_style_vector)
                    .unwrap_or_default();
                row.into_candidate(vector)
            })
            .collect())
    }
}
