//! Storage seams for the graph and recommendation services.
//!
//! Both traits are implemented by the PostgreSQL repositories and by
//! [`crate::memory::InMemoryStore`].

use async_trait::async_trait;
use sharegraph_common::{AppResult, PageRequest};

use crate::entities::friend_request;
use crate::models::{CandidatePost, PendingRequestItem, SeedPost, UserSearchItem, UserSummary};

/// Follow edges, friendships and friend requests.
///
/// Page windows passed in are already clamped. Search strings are already
/// trimmed; an empty string means no filter.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Insert a follow edge. Returns `false` if it already existed.
    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool>;

    /// Delete a follow edge. Returns `false` if there was none.
    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool>;

    /// Whether the follow edge exists.
    async fn is_following(&self, follower_id: i64, followee_id: i64) -> AppResult<bool>;

    /// Whether the pair has a friendship row.
    async fn are_friends(&self, a: i64, b: i64) -> AppResult<bool>;

    /// Friends of `user_id`, ordered by username then id.
    async fn list_friends(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>>;

    /// Users following `user_id`, ordered by username then id.
    async fn list_followers(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>>;

    /// Users `user_id` follows, ordered by username then id.
    async fn list_following(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>>;

    /// Count for [`GraphStore::list_friends`] with the same filter.
    async fn count_friends(&self, user_id: i64, search: &str) -> AppResult<u64>;

    /// Count for [`GraphStore::list_followers`] with the same filter.
    async fn count_followers(&self, user_id: i64, search: &str) -> AppResult<u64>;

    /// Count for [`GraphStore::list_following`] with the same filter.
    async fn count_following(&self, user_id: i64, search: &str) -> AppResult<u64>;

    /// Create a pending request.
    ///
    /// Fails with `BadRequest` if a pending request already exists between
    /// the pair in either direction.
    async fn create_friend_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model>;

    /// Look up a request in any state.
    async fn find_friend_request(&self, request_id: i64)
    -> AppResult<Option<friend_request::Model>>;

    /// Whether a pending request exists between the pair, either direction.
    async fn has_pending_between(&self, a: i64, b: i64) -> AppResult<bool>;

    /// Pending requests addressed to `addressee_id`, newest first.
    async fn list_incoming_requests(
        &self,
        addressee_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>>;

    /// Pending requests sent by `requester_id`, newest first.
    async fn list_outgoing_requests(
        &self,
        requester_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>>;

    /// Number of pending requests addressed to `addressee_id`.
    async fn count_incoming_requests(&self, addressee_id: i64) -> AppResult<u64>;

    /// Number of pending requests sent by `requester_id`.
    async fn count_outgoing_requests(&self, requester_id: i64) -> AppResult<u64>;

    /// Accept a pending request addressed to `addressee_id`.
    ///
    /// In one transaction: mark the request accepted, insert the canonical
    /// friendship row and both follow edges. Fails with `Forbidden` and
    /// writes nothing if the request is not pending or not addressed to
    /// `addressee_id`.
    async fn accept_friend_request(
        &self,
        request_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model>;

    /// Decline a pending request addressed to `addressee_id`.
    /// Fails with `Forbidden` if the guard does not match.
    async fn decline_friend_request(&self, request_id: i64, addressee_id: i64) -> AppResult<()>;

    /// Delete a pending request sent by `requester_id`.
    /// Fails with `Forbidden` if the guard does not match.
    async fn cancel_friend_request(&self, request_id: i64, requester_id: i64) -> AppResult<()>;

    /// In one transaction: delete the friendship row and both follow edges.
    /// Returns `false` if there was no friendship.
    async fn unfriend(&self, a: i64, b: i64) -> AppResult<bool>;

    /// Users `actor_id` could befriend whose username contains `search`.
    async fn search_addable_users(
        &self,
        actor_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSearchItem>>;

    /// Count for [`GraphStore::search_addable_users`].
    async fn count_addable_users(&self, actor_id: i64, search: &str) -> AppResult<u64>;
}

/// Read access to liked posts and document style features.
#[async_trait]
pub trait FeatureReader: Send + Sync {
    /// The user's most recently liked post with a finished, labelled
    /// feature row. `None` if there is none.
    async fn latest_liked_seed(&self, user_id: i64) -> AppResult<Option<SeedPost>>;

    /// Visible posts sharing `label`, excluding `exclude_post_id` and posts
    /// the user already liked, newest first. Rows without a parseable
    /// vector are skipped.
    async fn list_candidates(
        &self,
        user_id: i64,
        exclude_post_id: i64,
        label: &str,
        limit: u64,
    ) -> AppResult<Vec<CandidatePost>>;

    /// Visible posts ordered by like count, then recency.
    async fn list_fallback(&self, user_id: i64, limit: u64) -> AppResult<Vec<CandidatePost>>;
}
