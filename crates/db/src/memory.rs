//! In-memory graph and feature store.
//!
//! Implements [`GraphStore`] and [`FeatureReader`] over plain collections
//! behind one `tokio` lock. Every mutation runs against a copy of the state
//! that replaces the live state only once all of its writes succeeded, so a
//! failure part-way through leaves nothing behind. Failures can be injected
//! at fixed points with [`InMemoryStore::fail_next`].

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sharegraph_common::{AppError, AppResult, PageRequest};
use tokio::sync::RwLock;

use crate::entities::document_feature::{self, FeatureStatus, parse_style_vector};
use crate::entities::friend_request::{self, FriendRequestStatus};
use crate::entities::friendship::canonical_pair;
use crate::entities::post::{self, PostVisibility};
use crate::entities::user;
use crate::models::{CandidatePost, PendingRequestItem, SeedPost, UserSearchItem, UserSummary};
use crate::store::{FeatureReader, GraphStore};

/// Points inside multi-write operations where a failure can be injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    /// Accept: after the request row is marked accepted.
    AfterRequestUpdate,
    /// Accept: after the friendship row is inserted, before the follows.
    AfterFriendshipInsert,
    /// Unfriend: after the friendship row is deleted, before the follows.
    AfterFriendshipDelete,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    users: BTreeMap<i64, user::Model>,
    follows: BTreeSet<(i64, i64)>,
    friendships: BTreeSet<(i64, i64)>,
    requests: BTreeMap<i64, friend_request::Model>,
    next_request_id: i64,
    posts: BTreeMap<i64, post::Model>,
    post_tags: BTreeMap<i64, Vec<String>>,
    features: BTreeMap<i64, document_feature::Model>,
    /// (user, post) -> like sequence number; higher is more recent
    likes: BTreeMap<(i64, i64), u64>,
    like_seq: u64,
    saves: BTreeSet<(i64, i64)>,
}

#[derive(Debug, Default)]
struct Inner {
    state: GraphState,
    armed: Option<FailPoint>,
}

impl Inner {
    fn trip(&mut self, point: FailPoint) -> AppResult<()> {
        if self.armed == Some(point) {
            self.armed = None;
            return Err(AppError::Internal(format!("injected failure at {point:?}")));
        }
        Ok(())
    }
}

impl GraphState {
    fn matches(user: &user::Model, search: &str) -> bool {
        search.is_empty()
            || user
                .username
                .to_lowercase()
                .contains(&search.to_lowercase())
    }

    fn has_pending_between(&self, a: i64, b: i64) -> bool {
        self.requests.values().any(|r| {
            r.is_pending()
                && ((r.requester_id == a && r.addressee_id == b)
                    || (r.requester_id == b && r.addressee_id == a))
        })
    }

    fn are_friends(&self, a: i64, b: i64) -> bool {
        self.friendships.contains(&canonical_pair(a, b))
    }

    /// Users with the given ids that exist and match `search`, ordered by
    /// username then id.
    fn matching_users(&self, ids: impl IntoIterator<Item = i64>, search: &str) -> Vec<&user::Model> {
        let mut users: Vec<&user::Model> = ids
            .into_iter()
            .filter_map(|id| self.users.get(&id))
            .filter(|u| Self::matches(u, search))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
        users
    }

    fn summary(&self, viewer_id: i64, user: &user::Model) -> UserSummary {
        UserSummary {
            user_id: user.id,
            username: user.username.clone(),
            avatar: user.avatar_url.clone().unwrap_or_default(),
            is_friend: self.are_friends(viewer_id, user.id),
            is_following: self.follows.contains(&(viewer_id, user.id)),
        }
    }

    fn friend_ids(&self, user_id: i64) -> Vec<i64> {
        self.friendships
            .iter()
            .filter_map(|&(low, high)| {
                if low == user_id {
                    Some(high)
                } else if high == user_id {
                    Some(low)
                } else {
                    None
                }
            })
            .collect()
    }

    fn follower_ids(&self, user_id: i64) -> Vec<i64> {
        self.follows
            .iter()
            .filter(|(_, followee)| *followee == user_id)
            .map(|(follower, _)| *follower)
            .collect()
    }

    fn following_ids(&self, user_id: i64) -> Vec<i64> {
        self.follows
            .iter()
            .filter(|(follower, _)| *follower == user_id)
            .map(|(_, followee)| *followee)
            .collect()
    }

    fn addable_ids(&self, actor_id: i64) -> Vec<i64> {
        self.users
            .keys()
            .copied()
            .filter(|&id| {
                id != actor_id
                    && !self.are_friends(actor_id, id)
                    && !self.has_pending_between(actor_id, id)
            })
            .collect()
    }

    fn pending_items(
        &self,
        is_mine: impl Fn(&friend_request::Model) -> bool,
        other_party: impl Fn(&friend_request::Model) -> i64,
    ) -> Vec<PendingRequestItem> {
        let mut requests: Vec<&friend_request::Model> = self
            .requests
            .values()
            .filter(|r| r.is_pending() && is_mine(r))
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        requests
            .into_iter()
            .filter_map(|r| {
                let other = self.users.get(&other_party(r))?;
                Some(PendingRequestItem {
                    request_id: r.id,
                    user_id: other.id,
                    username: other.username.clone(),
                    avatar: other.avatar_url.clone().unwrap_or_default(),
                    requested_at: r.created_at,
                })
            })
            .collect()
    }

    fn is_visible(&self, viewer_id: i64, post: &post::Model) -> bool {
        match post.visibility {
            PostVisibility::Public => true,
            PostVisibility::Friends => self.are_friends(viewer_id, post.author_id),
        }
    }

    /// Finished feature row for a post's document, with label and vector.
    fn finished_feature(&self, post: &post::Model) -> Option<&document_feature::Model> {
        let feature = self.features.get(&post.document_id?)?;
        (feature.status == FeatureStatus::Done
            && feature.style_label.is_some()
            && feature.style_vector.is_some())
        .then_some(feature)
    }

    fn candidate(&self, viewer_id: i64, post: &post::Model, vector: Vec<f64>) -> Option<CandidatePost> {
        let author = self.users.get(&post.author_id)?;
        Some(CandidatePost {
            post_id: post.id,
            author_id: post.author_id,
            title: post.title.clone(),
            description: post.description.clone().unwrap_or_default(),
            cover_url: post.cover_url.clone().unwrap_or_default(),
            visibility: post.visibility,
            author_name: author.username.clone(),
            author_avatar: author.avatar_url.clone().unwrap_or_default(),
            tags: self.post_tags.get(&post.id).cloned().unwrap_or_default(),
            like_count: post.like_count,
            is_liked: self.likes.contains_key(&(viewer_id, post.id)),
            is_saved: self.saves.contains(&(viewer_id, post.id)),
            created_at: post.created_at,
            vector,
        })
    }
}

fn page<T>(items: Vec<T>, window: PageRequest) -> Vec<T> {
    items
        .into_iter()
        .skip(usize::try_from(window.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(window.limit()).unwrap_or(usize::MAX))
        .collect()
}

fn count(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

fn forbidden_transition() -> AppError {
    AppError::Forbidden("friend request is not pending or not yours to act on".to_string())
}

/// In-memory implementation of [`GraphStore`] and [`FeatureReader`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next operation that reaches `point` fail there.
    pub async fn fail_next(&self, point: FailPoint) {
        self.inner.write().await.armed = Some(point);
    }

    /// Add or replace a user.
    pub async fn add_user(&self, id: i64, username: &str, avatar_url: Option<&str>) {
        self.inner.write().await.state.users.insert(
            id,
            user::Model {
                id,
                username: username.to_string(),
                avatar_url: avatar_url.map(str::to_string),
                created_at: now(),
            },
        );
    }

    /// Add or replace a post with its tags.
    pub async fn add_post(&self, post: post::Model, tags: &[&str]) {
        let mut inner = self.inner.write().await;
        let mut tags: Vec<String> = tags.iter().map(|t| (*t).to_string()).collect();
        tags.sort();
        inner.state.post_tags.insert(post.id, tags);
        inner.state.posts.insert(post.id, post);
    }

    /// Add or replace a document feature row.
    pub async fn set_feature(&self, feature: document_feature::Model) {
        self.inner
            .write()
            .await
            .state
            .features
            .insert(feature.document_id, feature);
    }

    /// Record a like. Later likes are more recent than earlier ones.
    pub async fn like_post(&self, user_id: i64, post_id: i64) {
        let mut inner = self.inner.write().await;
        let state = &mut inner.state;
        state.like_seq += 1;
        let first_like = state.likes.insert((user_id, post_id), state.like_seq).is_none();
        if let Some(post) = state.posts.get_mut(&post_id).filter(|_| first_like) {
            post.like_count += 1;
        }
    }

    /// Record a save.
    pub async fn save_post(&self, user_id: i64, post_id: i64) {
        self.inner.write().await.state.saves.insert((user_id, post_id));
    }

    /// Number of follow edges (for consistency checks).
    pub async fn follow_count(&self) -> usize {
        self.inner.read().await.state.follows.len()
    }

    /// Number of friendship rows (for consistency checks).
    pub async fn friendship_count(&self) -> usize {
        self.inner.read().await.state.friendships.len()
    }
}

#[async_trait]
impl GraphStore for InMemoryStore {
    async fn insert_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .state
            .follows
            .insert((follower_id, followee_id)))
    }

    async fn delete_follow(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        Ok(self
            .inner
            .write()
            .await
            .state
            .follows
            .remove(&(follower_id, followee_id)))
    }

    async fn is_following(&self, follower_id: i64, followee_id: i64) -> AppResult<bool> {
        Ok(self
            .inner
            .read()
            .await
            .state
            .follows
            .contains(&(follower_id, followee_id)))
    }

    async fn are_friends(&self, a: i64, b: i64) -> AppResult<bool> {
        Ok(self.inner.read().await.state.are_friends(a, b))
    }

    async fn list_friends(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        let users = state.matching_users(state.friend_ids(user_id), search);
        Ok(page(users, window)
            .into_iter()
            .map(|u| state.summary(viewer_id, u))
            .collect())
    }

    async fn list_followers(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        let users = state.matching_users(state.follower_ids(user_id), search);
        Ok(page(users, window)
            .into_iter()
            .map(|u| state.summary(viewer_id, u))
            .collect())
    }

    async fn list_following(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSummary>> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        let users = state.matching_users(state.following_ids(user_id), search);
        Ok(page(users, window)
            .into_iter()
            .map(|u| state.summary(viewer_id, u))
            .collect())
    }

    async fn count_friends(&self, user_id: i64, search: &str) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        Ok(count(state.matching_users(state.friend_ids(user_id), search).len()))
    }

    async fn count_followers(&self, user_id: i64, search: &str) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        Ok(count(state.matching_users(state.follower_ids(user_id), search).len()))
    }

    async fn count_following(&self, user_id: i64, search: &str) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        Ok(count(state.matching_users(state.following_ids(user_id), search).len()))
    }

    async fn create_friend_request(
        &self,
        requester_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        let mut inner = self.inner.write().await;
        let state = &mut inner.state;
        if state.has_pending_between(requester_id, addressee_id) {
            return Err(AppError::BadRequest(
                "a pending friend request already exists between these users".to_string(),
            ));
        }

        state.next_request_id += 1;
        let request = friend_request::Model {
            id: state.next_request_id,
            requester_id,
            addressee_id,
            status: FriendRequestStatus::Pending,
            created_at: now(),
            decided_at: None,
        };
        state.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_friend_request(
        &self,
        request_id: i64,
    ) -> AppResult<Option<friend_request::Model>> {
        Ok(self.inner.read().await.state.requests.get(&request_id).cloned())
    }

    async fn has_pending_between(&self, a: i64, b: i64) -> AppResult<bool> {
        Ok(self.inner.read().await.state.has_pending_between(a, b))
    }

    async fn list_incoming_requests(
        &self,
        addressee_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>> {
        let inner = self.inner.read().await;
        let items = inner
            .state
            .pending_items(|r| r.addressee_id == addressee_id, |r| r.requester_id);
        Ok(page(items, window))
    }

    async fn list_outgoing_requests(
        &self,
        requester_id: i64,
        window: PageRequest,
    ) -> AppResult<Vec<PendingRequestItem>> {
        let inner = self.inner.read().await;
        let items = inner
            .state
            .pending_items(|r| r.requester_id == requester_id, |r| r.addressee_id);
        Ok(page(items, window))
    }

    async fn count_incoming_requests(&self, addressee_id: i64) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(count(
            inner
                .state
                .requests
                .values()
                .filter(|r| r.is_pending() && r.addressee_id == addressee_id)
                .count(),
        ))
    }

    async fn count_outgoing_requests(&self, requester_id: i64) -> AppResult<u64> {
        let inner = self.inner.read().await;
        Ok(count(
            inner
                .state
                .requests
                .values()
                .filter(|r| r.is_pending() && r.requester_id == requester_id)
                .count(),
        ))
    }

    async fn accept_friend_request(
        &self,
        request_id: i64,
        addressee_id: i64,
    ) -> AppResult<friend_request::Model> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.clone();

        let request = next
            .requests
            .get_mut(&request_id)
            .filter(|r| r.addressee_id == addressee_id && r.is_pending())
            .ok_or_else(forbidden_transition)?;
        request.status = FriendRequestStatus::Accepted;
        request.decided_at = Some(now());
        let request = request.clone();
        inner.trip(FailPoint::AfterRequestUpdate)?;

        next.friendships
            .insert(canonical_pair(request.requester_id, request.addressee_id));
        inner.trip(FailPoint::AfterFriendshipInsert)?;

        next.follows.insert((request.requester_id, request.addressee_id));
        next.follows.insert((request.addressee_id, request.requester_id));

        inner.state = next;
        Ok(request)
    }

    async fn decline_friend_request(&self, request_id: i64, addressee_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let request = inner
            .state
            .requests
            .get_mut(&request_id)
            .filter(|r| r.addressee_id == addressee_id && r.is_pending())
            .ok_or_else(forbidden_transition)?;
        request.status = FriendRequestStatus::Declined;
        request.decided_at = Some(now());
        Ok(())
    }

    async fn cancel_friend_request(&self, request_id: i64, requester_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let requests = &mut inner.state.requests;
        let allowed = requests
            .get(&request_id)
            .is_some_and(|r| r.requester_id == requester_id && r.is_pending());
        if !allowed {
            return Err(forbidden_transition());
        }
        requests.remove(&request_id);
        Ok(())
    }

    async fn unfriend(&self, a: i64, b: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.clone();

        if !next.friendships.remove(&canonical_pair(a, b)) {
            return Ok(false);
        }
        inner.trip(FailPoint::AfterFriendshipDelete)?;

        next.follows.remove(&(a, b));
        next.follows.remove(&(b, a));

        inner.state = next;
        Ok(true)
    }

    async fn search_addable_users(
        &self,
        actor_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Vec<UserSearchItem>> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        let users = state.matching_users(state.addable_ids(actor_id), search);
        Ok(page(users, window)
            .into_iter()
            .map(|u| UserSearchItem {
                user_id: u.id,
                username: u.username.clone(),
                avatar: u.avatar_url.clone().unwrap_or_default(),
            })
            .collect())
    }

    async fn count_addable_users(&self, actor_id: i64, search: &str) -> AppResult<u64> {
        let inner = self.inner.read().await;
        let state = &inner.state;
        Ok(count(state.matching_users(state.addable_ids(actor_id), search).len()))
    }
}

#[async_trait]
impl FeatureReader for InMemoryStore {
    async fn latest_liked_seed(&self, user_id: i64) -> AppResult<Option<SeedPost>> {
        let inner = self.inner.read().await;
        let state = &inner.state;

        let mut liked: Vec<(u64, i64)> = state
            .likes
            .iter()
            .filter(|((liker, _), _)| *liker == user_id)
            .map(|(&(_, post_id), &seq)| (seq, post_id))
            .collect();
        liked.sort_unstable_by(|a, b| b.cmp(a));

        Ok(liked.into_iter().find_map(|(_, post_id)| {
            let post = state.posts.get(&post_id)?;
            let feature = state.finished_feature(post)?;
            Some(SeedPost {
                post_id,
                label: feature.style_label.clone()?,
                vector: feature
                    .style_vector
                    .as_ref()
                    .and_then(parse_style_vector)
                    .unwrap_or_default(),
            })
        }))
    }

    async fn list_candidates(
        &self,
        user_id: i64,
        exclude_post_id: i64,
        label: &str,
        limit: u64,
    ) -> AppResult<Vec<CandidatePost>> {
        let inner = self.inner.read().await;
        let state = &inner.state;

        let mut posts: Vec<(&post::Model, &document_feature::Model)> = state
            .posts
            .values()
            .filter(|p| p.id != exclude_post_id)
            .filter(|p| !state.likes.contains_key(&(user_id, p.id)))
            .filter(|p| state.is_visible(user_id, p))
            .filter_map(|p| Some((p, state.finished_feature(p)?)))
            .filter(|(_, f)| f.style_label.as_deref() == Some(label))
            .collect();
        posts.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(posts
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .filter_map(|(post, feature)| {
                let vector = feature.style_vector.as_ref().and_then(parse_style_vector)?;
                state.candidate(user_id, post, vector)
            })
            .collect())
    }

    async fn list_fallback(&self, user_id: i64, limit: u64) -> AppResult<Vec<CandidatePost>> {
        let inner = self.inner.read().await;
        let state = &inner.state;

        let mut posts: Vec<&post::Model> = state
            .posts
            .values()
            .filter(|p| state.is_visible(user_id, p))
            .collect();
        posts.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        Ok(posts
            .into_iter()
            .filter_map(|post| {
                let vector = post
                    .document_id
                    .and_then(|doc| state.features.get(&doc))
                    .and_then(|f| f.style_vector.as_ref())
                    .and_then(parse_style_vector)
                    .unwrap_or_default();
                state.candidate(user_id, post, vector)
            })
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store_with_users(ids: &[(i64, &str)]) -> InMemoryStore {
        let store = InMemoryStore::new();
        for (id, name) in ids {
            store.add_user(*id, name, None).await;
        }
        store
    }

    #[tokio::test]
    async fn test_accept_rolls_back_on_injected_failure() {
        let store = store_with_users(&[(1, "alice"), (2, "bob")]).await;
        let request = store.create_friend_request(1, 2).await.unwrap();

        store.fail_next(FailPoint::AfterFriendshipInsert).await;
        assert!(store.accept_friend_request(request.id, 2).await.is_err());

        assert!(!store.are_friends(1, 2).await.unwrap());
        assert_eq!(store.follow_count().await, 0);
        let unchanged = store.find_friend_request(request.id).await.unwrap().unwrap();
        assert!(unchanged.is_pending());
        assert!(unchanged.decided_at.is_none());

        // The fail point is one-shot
        store.accept_friend_request(request.id, 2).await.unwrap();
        assert!(store.are_friends(2, 1).await.unwrap());
        assert_eq!(store.follow_count().await, 2);
    }

    #[tokio::test]
    async fn test_unfriend_rolls_back_on_injected_failure() {
        let store = store_with_users(&[(1, "alice"), (2, "bob")]).await;
        let request = store.create_friend_request(1, 2).await.unwrap();
        store.accept_friend_request(request.id, 2).await.unwrap();

        store.fail_next(FailPoint::AfterFriendshipDelete).await;
        assert!(store.unfriend(1, 2).await.is_err());
        assert_eq!(store.friendship_count().await, 1);
        assert_eq!(store.follow_count().await, 2);

        assert!(store.unfriend(1, 2).await.unwrap());
        assert_eq!(store.friendship_count().await, 0);
        assert_eq!(store.follow_count().await, 0);
    }

    #[tokio::test]
    async fn test_unfriend_without_friendship_keeps_follows() {
        let store = store_with_users(&[(1, "alice"), (2, "bob")]).await;
        store.insert_follow(1, 2).await.unwrap();
        store.insert_follow(2, 1).await.unwrap();

        assert!(!store.unfriend(1, 2).await.unwrap());
        assert_eq!(store.follow_count().await, 2);
    }

    #[tokio::test]
    async fn test_create_rejects_second_pending_in_either_direction() {
        let store = store_with_users(&[(1, "alice"), (2, "bob")]).await;
        store.create_friend_request(1, 2).await.unwrap();

        assert!(matches!(
            store.create_friend_request(2, 1).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_listing_orders_by_username_then_id() {
        let store = store_with_users(&[(1, "zed"), (2, "amy"), (3, "amy"), (4, "Bo")]).await;
        for follower in [2, 3, 4] {
            store.insert_follow(follower, 1).await.unwrap();
        }

        let followers = store
            .list_followers(1, 1, "", PageRequest::default())
            .await
            .unwrap();
        let ids: Vec<i64> = followers.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![4, 2, 3]);

        let filtered = store
            .list_followers(1, 1, "AM", PageRequest::default())
            .await
            .unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(store.count_followers(1, "am").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_like_post_bumps_like_count_once() {
        let store = store_with_users(&[(1, "alice")]).await;
        store
            .add_post(
                post::Model {
                    id: 10,
                    author_id: 1,
                    title: "Poster".to_string(),
                    description: None,
                    cover_url: None,
                    visibility: PostVisibility::Public,
                    document_id: None,
                    like_count: 0,
                    created_at: now(),
                },
                &["swiss", "bold"],
            )
            .await;

        store.like_post(1, 10).await;
        store.like_post(1, 10).await;

        let posts = store.list_fallback(1, 5).await.unwrap();
        assert_eq!(posts[0].like_count, 1);
        assert!(posts[0].is_liked);
        assert_eq!(posts[0].tags, vec!["bold", "swiss"]);
    }
}
