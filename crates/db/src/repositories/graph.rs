//! Graph repository: follow edges, friendships and friend requests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, FromQueryResult, NotSet, PaginatorTrait, QueryFilter, Set, SqlErr, Statement,
    TransactionTrait, Value,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
};
use sharegraph_common::{AppError, AppResult, PageRequest};

use crate::entities::friend_request::FriendRequestStatus;
use crate::entities::friendship::canonical_pair;
use crate::entities::{FriendRequest, Following, Friendship, friend_request, following, friendship};
use crate::models::{PendingRequestItem, UserSearchItem, UserSummary};
use crate::store::GraphStore;

/// Columns of a [`UserSummary`] row for user `u`, relative to viewer `$1`.
const USER_SUMMARY_COLUMNS: &str = r"
    u.id AS user_id,
    u.username AS username,
    COALESCE(u.avatar_url, '') AS avatar,
    EXISTS (
        SELECT 1 FROM friendship fs
        WHERE fs.user_low_id = LEAST($1, u.id) AND fs.user_high_id = GREATEST($1, u.id)
    ) AS is_friend,
    EXISTS (
        SELECT 1 FROM following fo
        WHERE fo.follower_id = $1 AND fo.followee_id = u.id
    ) AS is_following";

/// Users other than `$1` who are neither friends with `$1` nor share a
/// pending request with `$1`, filtered by username pattern `$2`.
const ADDABLE_USERS_FILTER: &str = r#"
    FROM "user" u
    WHERE u.id <> $1
      AND u.username ILIKE $2
      AND NOT EXISTS (
          SELECT 1 FROM friendship fs
          WHERE fs.user_low_id = LEAST($1, u.id) AND fs.user_high_id = GREATEST($1, u.id)
      )
      AND NOT EXISTS (
          SELECT 1 FROM friend_request fr
          WHERE fr.status = 'pending'
            AND ((fr.requester_id = $1 AND fr.addressee_id = u.id)
              OR (fr.requester_id = u.id AND fr.addressee_id = $1))
      )"#;

#[derive(FromQueryResult)]
struct CountRow {
    count: i64,
}

/// `ILIKE` pattern matching `search` anywhere in the value. An empty search
/// matches everything.
fn contains_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn window_values(window: PageRequest) -> [Value; 2] {
    let offset = i64::try_from(window.offset()).unwrap_or(i64::MAX);
    [window.size.into(), offset.into()]
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn decided_at() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn forbidden_transition() -> AppError {
    AppError::Forbidden("friend request is not pending or not yours to act on".to_string())
}

/// Graph repository for database operations.
#[derive(Clone)]
pub struct GraphRepository {
    db: Arc<DatabaseConnection>,
}

impl GraphRepository {
    /// Create a new graph repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn query_summaries(&self, sql: &str, values: Vec<Value>) -> AppResult<Vec<UserSummary>> {
        UserSummary::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn query_count(&self, sql: &str, values: Vec<Value>) -> AppResult<u64> {
        let row = CountRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            values,
        ))
        .one(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.map_or(0, |r| u64::try_from(r.count).unwrap_or_default()))
    }

    async fn query_requests(
        &self,
        sql: &str,
        user_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>> {
        let [limit, offset] = window_values(window);
        PendingRequestItem::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [user_id.into(), limit, offset],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    fn follow_model(follower_id: i64, followee_id: i64) -> following::ActiveModel {
        following::ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
            created_at: Set(Utc::now().into()),
        }
    }

    fn follow_conflict() -> OnConflict {
        OnConflict::columns([following::Column::FollowerId, following::Column::FolloweeId])
            .do_nothing()
            .to_owned()
    }

    fn pair_condition(a: i64, b: i64) -> Condition {
        Condition::any()
            .add(
                Condition::all()
                    .add(following::Column::FollowerId.eq(a))
                    .add(following::Column::FolloweeId.eq(b)),
            )
            .add(
                Condition::all()
                    .add(following::Column::FollowerId.eq(b))
                    .add(following::Column::FolloweeId.eq(a)),
            )
    }
}

#[async_trait]
impl GraphStore for GraphRepository {
    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        let inserted = Following::insert(Self::follow_model(follower_id, followee_id))
            .on_conflict(Self::follow_conflict())
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        let result = Following::delete_by_id((follower_id, followee_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        let edge = Following::find_by_id((follower_id, followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(edge.is_some())
    }

    async fn are_friends(&self, a: i64, b: i64) -> AppResult<bool> {
        let row = Friendship::find_by_id(canonical_pair(a, b))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(row.is_some())
    }

    async fn list_friends(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let sql = format!(
            r#"
            WITH friend_ids AS (
                SELECT CASE WHEN f.user_low_id = $2 THEN f.user_high_id ELSE f.user_low_id END AS id
                FROM friendship f
                WHERE f.user_low_id = $2 OR f.user_high_id = $2
            )
            SELECT {USER_SUMMARY_COLUMNS}
            FROM friend_ids fi
            JOIN "user" u ON u.id = fi.id
            WHERE u.username ILIKE $3
            ORDER BY u.username ASC, u.id ASC
            LIMIT $4 OFFSET $5
            "#
        );
        let [limit, offset] = window_values(window);
        self.query_summaries(
            &sql,
            vec![
                viewer_id.into(),
                user_id.into(),
                contains_pattern(search).into(),
                limit,
                offset,
            ],
        )
        .await
    }

    async fn list_followers(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let sql = format!(
            r#"
            SELECT {USER_SUMMARY_COLUMNS}
            FROM following f
            JOIN "user" u ON u.id = f.follower_id
            WHERE f.followee_id = $2
              AND u.username ILIKE $3
            ORDER BY u.username ASC, u.id ASC
            LIMIT $4 OFFSET $5
            "#
        );
        let [limit, offset] = window_values(window);
        self.query_summaries(
            &sql,
            vec![
                viewer_id.into(),
                user_id.into(),
                contains_pattern(search).into(),
                limit,
                offset,
            ],
        )
        .await
    }

    async fn list_following(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let sql = format!(
            r#"
            SELECT {USER_SUMMARY_COLUMNS}
            FROM following f
            JOIN "user" u ON u.id = f.followee_id
            WHERE f.follower_id = $2
              AND u.username ILIKE $3
            ORDER BY u.username ASC, u.id ASC
            LIMIT $4 OFFSET $5
            "#
        );
        let [limit, offset] = window_values(window);
        self.query_summaries(
            &sql,
            vec![
                viewer_id.into(),
                user_id.into(),
                contains_pattern(search).into(),
                limit,
                offset,
            ],
        )
        .await
    }

    async fn count_friends(&self, user_id: i64, search: &str) -> AppResult<u64> {
        self.query_count(
            r#"
            SELECT COUNT(*) AS count
            FROM friendship f
            JOIN "user" u
              ON u.id = CASE WHEN f.user_low_id = $1 THEN f.user_high_id ELSE f.user_low_id END
            WHERE (f.user_low_id = $1 OR f.user_high_id = $1)
              AND u.username ILIKE $2
            "#,
            vec![user_id.into(), contains_pattern(search).into()],
        )
        .await
    }

    async fn count_followers(&self, user_id: i64, search: &str) -> AppResult<u64> {
        self.query_count(
            r#"
            SELECT COUNT(*) AS count
            FROM following f
            JOIN "user" u ON u.id = f.follower_id
            WHERE f.followee_id = $1 AND u.username ILIKE $2
            "#,
            vec![user_id.into(), contains_pattern(search).into()],
        )
        .await
    }

    async fn count_following(&self, user_id: i64, search: &str) -> AppResult<u64> {
        self.query_count(
            r#"
            SELECT COUNT(*) AS count
            FROM following f
            JOIN "user" u ON u.id = f.followee_id
            WHERE f.follower_id = $1 AND u.username ILIKE $2
            "#,
            vec![user_id.into(), contains_pattern(search).into()],
        )
        .await
    }

    async fn create_friend_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        let model = friend_request::ActiveModel {
            id: NotSet,
            requester_id: Set(requester_id),
            addressee_id: Set(addressee_id),
            status: Set(FriendRequestStatus::Pending),
            created_at: Set(Utc::now().into()),
            decided_at: Set(None),
        };

        model.insert(self.db.as_ref()).await.map_err(|e| {
            // Lost the race against a concurrent send for the same pair
            if is_unique_violation(&e) {
                AppError::BadRequest(
                    "a pending friend request already exists between these users".to_string(),
                )
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    async fn find_friend_request(
        &self,
        request_id: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        FriendRequest::find_by_id(request_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn has_pending_between(&self, a: i64, b: i64) -> AppResult<bool> {
        let pending = FriendRequest::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(friend_request::Column::RequesterId.eq(a))
                            .add(friend_request::Column::AddresseeId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(friend_request::Column::RequesterId.eq(b))
                            .add(friend_request::Column::AddresseeId.eq(a)),
                    ),
            )
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pending.is_some())
    }

    async fn list_incoming_requests(
        &self,
        addressee_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>> {
        self.query_requests(
            r#"
            SELECT fr.id AS request_id,
                   fr.requester_id AS user_id,
                   u.username AS username,
                   COALESCE(u.avatar_url, '') AS avatar,
                   fr.created_at AS requested_at
            FROM friend_request fr
            JOIN "user" u ON u.id = fr.requester_id
            WHERE fr.addressee_id = $1 AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            LIMIT $2 OFFSET $3
            "#,
            addressee_id,
            window,
        )
        .await
    }

    async fn list_outgoing_requests(
        &self,
        requester_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>> {
        self.query_requests(
            r#"
            SELECT fr.id AS request_id,
                   fr.addressee_id AS user_id,
                   u.username AS username,
                   COALESCE(u.avatar_url, '') AS avatar,
                   fr.created_at AS requested_at
            FROM friend_request fr
            JOIN "user" u ON u.id = fr.addressee_id
            WHERE fr.requester_id = $1 AND fr.status = 'pending'
            ORDER BY fr.created_at DESC, fr.id DESC
            LIMIT $2 OFFSET $3
            "#,
            requester_id,
            window,
        )
        .await
    }

    async fn count_incoming_requests(&self, addressee_id: i64) -> AppResult<u64> {
        FriendRequest::find()
            .filter(friend_request::Column::AddresseeId.eq(addressee_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_outgoing_requests(&self, requester_id: i64) -> AppResult<u64> {
        FriendRequest::find()
            .filter(friend_request::Column::RequesterId.eq(requester_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn accept_friend_request(
        &self,
        request_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Returning early drops `txn`, which rolls it back.
        let updated = FriendRequest::update_many()
            .col_expr(
                friend_request::Column::Status,
                Expr::value(FriendRequestStatus::Accepted.to_value()),
            )
            .col_expr(
                friend_request::Column::DecidedAt,
                Expr::value(decided_at()),
            )
            .filter(friend_request::Column::Id.eq(request_id))
            .filter(friend_request::Column::AddresseeId.eq(addressee_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            return Err(forbidden_transition());
        }

        let request = FriendRequest::find_by_id(request_id)
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("friend request {request_id}")))?;

        let (low, high) = canonical_pair(request.requester_id, request.addressee_id);
        Friendship::insert(friendship::ActiveModel {
            user_low_id: Set(low),
            user_high_id: Set(high),
            created_at: Set(Utc::now().into()),
        })
        .on_conflict(
            OnConflict::columns([friendship::Column::UserLowId, friendship::Column::UserHighId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Following::insert_many([
            Self::follow_model(request.requester_id, request.addressee_id),
            Self::follow_model(request.addressee_id, request.requester_id),
        ])
        .on_conflict(Self::follow_conflict())
        .exec_without_returning(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(request)
    }

    async fn decline_friend_request(&self, request_id: i64, addressee_id: i64) -> AppResult<()> {
        let updated = FriendRequest::update_many()
            .col_expr(
                friend_request::Column::Status,
                Expr::value(FriendRequestStatus::Declined.to_value()),
            )
            .col_expr(
                friend_request::Column::DecidedAt,
                Expr::value(decided_at()),
            )
            .filter(friend_request::Column::Id.eq(request_id))
            .filter(friend_request::Column::AddresseeId.eq(addressee_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if updated.rows_affected == 0 {
            return Err(forbidden_transition());
        }
        Ok(())
    }

    async fn cancel_friend_request(&self, request_id: i64, requester_id: i64) -> AppResult<()> {
        let deleted = FriendRequest::delete_many()
            .filter(friend_request::Column::Id.eq(request_id))
            .filter(friend_request::Column::RequesterId.eq(requester_id))
            .filter(friend_request::Column::Status.eq(FriendRequestStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Err(forbidden_transition());
        }
        Ok(())
    }

    async fn unfriend(&self, a: i64, b: i64) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let removed = Friendship::delete_by_id(canonical_pair(a, b))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        if removed.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        Following::delete_many()
            .filter(Self::pair_condition(a, b))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    async fn search_addable_users(
        &self,
        actor_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSearchItem>> {
        let sql = format!(
            r"
            SELECT u.id AS user_id,
                   u.username AS username,
                   COALESCE(u.avatar_url, '') AS avatar
            {ADDABLE_USERS_FILTER}
            ORDER BY u.username ASC, u.id ASC
            LIMIT $3 OFFSET $4
            "
        );
        let [limit, offset] = window_values(window);
        UserSearchItem::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            &sql,
            [actor_id.into(), contains_pattern(search).into(), limit, offset],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_addable_users(&self, actor_id: i64, search: &str) -> AppResult<u64> {
        let sql = format!("SELECT COUNT(*) AS count {ADDABLE_USERS_FILTER}");
        self.query_count(&sql, vec![actor_id.into(), contains_pattern(search).into()])
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn request(id: i64, requester_id: i64, addressee_id: i64) -> friend_request::Model {
        friend_request::Model {
            id,
            requester_id,
            addressee_id,
            status: FriendRequestStatus::Pending,
            created_at: Utc::now().into(),
            decided_at: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern(""), "%%");
        assert_eq!(contains_pattern("al"), "%al%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_insert_follow_reports_new_edge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0)])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert!(repo.insert_follow(1, 2).await.unwrap());
        assert!(!repo.insert_follow(1, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_following() {
        let edge = following::Model {
            follower_id: 1,
            followee_id: 2,
            created_at: Utc::now().into(),
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![edge], vec![]])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert!(repo.is_following(1, 2).await.unwrap());
        assert!(!repo.is_following(2, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_friends_maps_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "user_id" => Value::from(2i64),
                    "username" => Value::from("bob"),
                    "avatar" => Value::from(""),
                    "is_friend" => Value::from(true),
                    "is_following" => Value::from(false),
                }]])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        let items = repo
            .list_friends(1, 1, "", PageRequest::default())
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].user_id, 2);
        assert_eq!(items[0].username, "bob");
        assert!(items[0].is_friend);
        assert!(!items[0].is_following);
    }

    #[tokio::test]
    async fn test_count_incoming_requests() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => Value::BigInt(Some(4))
                }]])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert_eq!(repo.count_incoming_requests(7).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_create_friend_request_returns_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request(10, 1, 2)]])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        let created = repo.create_friend_request(1, 2).await.unwrap();

        assert_eq!(created.id, 10);
        assert!(created.is_pending());
    }

    #[tokio::test]
    async fn test_accept_rejects_when_guard_matches_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        let result = repo.accept_friend_request(10, 3).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_accept_writes_friendship_and_follows() {
        let mut accepted = request(10, 1, 2);
        accepted.status = FriendRequestStatus::Accepted;
        accepted.decided_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1), exec(2)])
                .append_query_results([[accepted]])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        let result = repo.accept_friend_request(10, 2).await.unwrap();

        assert_eq!(result.requester_id, 1);
        assert_eq!(result.status, FriendRequestStatus::Accepted);
    }

    #[tokio::test]
    async fn test_decline_and_cancel_guarded() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0)])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert!(repo.decline_friend_request(10, 2).await.is_ok());
        assert!(matches!(
            repo.cancel_friend_request(10, 2).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_unfriend_reports_removed_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(2)])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert!(repo.unfriend(2, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfriend_without_friendship_leaves_follows() {
        // Only the friendship delete has a result; a follow delete would fail
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = GraphRepository::new(db);
        assert!(!repo.unfriend(1, 2).await.unwrap());
    }
}
