//! Friend service: follows, friendships and the friend-request lifecycle.

use std::sync::Arc;

use crate::services::event_publisher::{EventPublisherService, GraphEvent};
use sharegraph_common::{AppError, AppResult, Page, PageRequest};
use sharegraph_db::{
    entities::friend_request,
    models::{FollowStats, PendingRequestItem, UserSearchItem, UserSummary},
    store::GraphStore,
};

/// Friend service for business logic.
///
/// Every precondition is checked before the store is written to; the
/// multi-row transitions (accept, unfriend) are atomic inside the store.
#[derive(Clone)]
pub struct FriendService {
    store: Arc<dyn GraphStore>,
    event_publisher: Option<EventPublisherService>,
}

fn require_ids(ids: &[i64]) -> AppResult<()> {
    if ids.iter().any(|id| *id <= 0) {
        return Err(AppError::BadRequest("Identifiers must be positive".to_string()));
    }
    Ok(())
}

fn normalize_search(search: &str) -> &str {
    search.trim()
}

fn forbidden_request() -> AppError {
    AppError::Forbidden("Not allowed to act on this friend request".to_string())
}

impl FriendService {
    /// Create a new friend service.
    #[must_use]
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            event_publisher: None,
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    async fn publish(&self, event: GraphEvent) {
        let Some(ref event_publisher) = self.event_publisher else {
            return;
        };
        if let Err(e) = event_publisher.publish(&event).await {
            tracing::warn!(error = %e, event = event.name(), "Failed to publish graph event");
        }
    }

    // ==================== Follows ====================

    /// Follow a user. Returns `false` when the edge already existed.
    pub async fn follow(&self, actor_id: i64, target_id: i64) -> AppResult<bool> {
        require_ids(&[actor_id, target_id])?;
        if actor_id == target_id {
            return Err(AppError::InvalidSelfAction);
        }

        let created = self.store.insert_follow(actor_id, target_id).await?;
        if created {
            tracing::debug!(actor_id, target_id, "Follow created");
            self.publish(GraphEvent::Followed {
                follower_id: actor_id,
                followee_id: target_id,
            })
            .await;
        }
        Ok(created)
    }

    /// Unfollow a user. Absence of the edge is not an error.
    pub async fn unfollow(&self, actor_id: i64, target_id: i64) -> AppResult<()> {
        require_ids(&[actor_id, target_id])?;

        if self.store.delete_follow(actor_id, target_id).await? {
            tracing::debug!(actor_id, target_id, "Follow removed");
            self.publish(GraphEvent::Unfollowed {
                follower_id: actor_id,
                followee_id: target_id,
            })
            .await;
        }
        Ok(())
    }

    /// Check if `actor_id` follows `target_id`.
    pub async fn is_following(&self, actor_id: i64, target_id: i64) -> AppResult<bool> {
        require_ids(&[actor_id, target_id])?;
        self.store.is_following(actor_id, target_id).await
    }

    /// Check if two users are friends.
    pub async fn are_friends(&self, a: i64, b: i64) -> AppResult<bool> {
        require_ids(&[a, b])?;
        self.store.are_friends(a, b).await
    }

    // ==================== Listings ====================

    /// List the friends of `user_id`. Any viewer may see them.
    pub async fn list_friends(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        require_ids(&[user_id])?;
        let search = normalize_search(search);
        let window = window.clamp();

        let items = self
            .store
            .list_friends(viewer_id, user_id, search, window)
            .await?;
        let total = self.store.count_friends(user_id, search).await?;
        Ok(Page::new(items, total, window))
    }

    /// List the followers of `user_id`. Only the owner may see them.
    pub async fn list_followers(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        Self::require_owner(viewer_id, user_id)?;
        let search = normalize_search(search);
        let window = window.clamp();

        let items = self
            .store
            .list_followers(viewer_id, user_id, search, window)
            .await?;
        let total = self.store.count_followers(user_id, search).await?;
        Ok(Page::new(items, total, window))
    }

    /// List the users `user_id` follows. Only the owner may see them.
    pub async fn list_following(
        &self,
        viewer_id: i64,
        user_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Page<UserSummary>> {
        Self::require_owner(viewer_id, user_id)?;
        let search = normalize_search(search);
        let window = window.clamp();

        let items = self
            .store
            .list_following(viewer_id, user_id, search, window)
            .await?;
        let total = self.store.count_following(user_id, search).await?;
        Ok(Page::new(items, total, window))
    }

    fn require_owner(viewer_id: i64, user_id: i64) -> AppResult<()> {
        require_ids(&[viewer_id, user_id])?;
        if viewer_id != user_id {
            return Err(AppError::Forbidden(
                "Only the owner can list followers and following".to_string(),
            ));
        }
        Ok(())
    }

    /// Follower, following and friend counts. Public.
    pub async fn get_follow_stats(&self, user_id: i64) -> AppResult<FollowStats> {
        require_ids(&[user_id])?;
        Ok(FollowStats {
            followers: self.store.count_followers(user_id, "").await?,
            following: self.store.count_following(user_id, "").await?,
            friends: self.store.count_friends(user_id, "").await?,
        })
    }

    // ==================== Friend requests ====================

    /// Send a friend request and return its id.
    pub async fn send_friend_request(&self, actor_id: i64, to_user_id: i64) -> AppResult<i64> {
        require_ids(&[actor_id, to_user_id])?;
        if actor_id == to_user_id {
            return Err(AppError::InvalidSelfAction);
        }
        if self.store.are_friends(actor_id, to_user_id).await? {
            return Err(AppError::AlreadyFriends);
        }
        if self.store.has_pending_between(actor_id, to_user_id).await? {
            return Err(AppError::BadRequest(
                "A friend request is already pending".to_string(),
            ));
        }

        let request = self
            .store
            .create_friend_request(actor_id, to_user_id)
            .await?;
        tracing::info!(
            request_id = request.id,
            actor_id,
            to_user_id,
            "Friend request sent"
        );
        self.publish(GraphEvent::FriendRequestSent {
            request_id: request.id,
            requester_id: actor_id,
            addressee_id: to_user_id,
        })
        .await;

        Ok(request.id)
    }

    /// Pending requests addressed to the actor, newest first.
    pub async fn list_incoming_requests(
        &self,
        actor_id: i64,
        window: PageRequest,
    ) -> AppResult<Page<PendingRequestItem>> {
        require_ids(&[actor_id])?;
        let window = window.clamp();

        let items = self.store.list_incoming_requests(actor_id, window).await?;
        let total = self.store.count_incoming_requests(actor_id).await?;
        Ok(Page::new(items, total, window))
    }

    /// Pending requests sent by the actor, newest first.
    pub async fn list_outgoing_requests(
        &self,
        actor_id: i64,
        window: PageRequest,
    ) -> AppResult<Page<PendingRequestItem>> {
        require_ids(&[actor_id])?;
        let window = window.clamp();

        let items = self.store.list_outgoing_requests(actor_id, window).await?;
        let total = self.store.count_outgoing_requests(actor_id).await?;
        Ok(Page::new(items, total, window))
    }

    /// Load a request and check it is pending with `matches` holding for it.
    async fn pending_request(
        &self,
        request_id: i64,
        matches: impl FnOnce(&friend_request::Model) -> bool,
    ) -> AppResult<friend_request::Model> {
        let request = self
            .store
            .find_friend_request(request_id)
            .await?
            .ok_or_else(forbidden_request)?;
        if !request.is_pending() || !matches(&request) {
            return Err(forbidden_request());
        }
        Ok(request)
    }

    /// Accept a request addressed to the actor.
    ///
    /// Creates the friendship and both follow edges atomically.
    pub async fn accept_friend_request(&self, actor_id: i64, request_id: i64) -> AppResult<()> {
        require_ids(&[actor_id, request_id])?;
        self.pending_request(request_id, |r| r.addressee_id == actor_id)
            .await?;

        let accepted = self
            .store
            .accept_friend_request(request_id, actor_id)
            .await?;
        tracing::info!(
            request_id,
            actor_id,
            requester_id = accepted.requester_id,
            "Friend request accepted"
        );
        self.publish(GraphEvent::FriendRequestAccepted {
            request_id,
            requester_id: accepted.requester_id,
            addressee_id: actor_id,
        })
        .await;

        Ok(())
    }

    /// Decline a request addressed to the actor.
    pub async fn decline_friend_request(&self, actor_id: i64, request_id: i64) -> AppResult<()> {
        require_ids(&[actor_id, request_id])?;
        self.pending_request(request_id, |r| r.addressee_id == actor_id)
            .await?;

        self.store
            .decline_friend_request(request_id, actor_id)
            .await?;
        tracing::info!(request_id, actor_id, "Friend request declined");
        self.publish(GraphEvent::FriendRequestDeclined {
            request_id,
            addressee_id: actor_id,
        })
        .await;

        Ok(())
    }

    /// Cancel a request the actor sent.
    pub async fn cancel_friend_request(&self, actor_id: i64, request_id: i64) -> AppResult<()> {
        require_ids(&[actor_id, request_id])?;
        self.pending_request(request_id, |r| r.requester_id == actor_id)
            .await?;

        self.store.cancel_friend_request(request_id, actor_id).await?;
        tracing::info!(request_id, actor_id, "Friend request cancelled");
        Ok(())
    }

    /// Remove a friendship and both follow edges atomically.
    pub async fn unfriend(&self, actor_id: i64, other_id: i64) -> AppResult<()> {
        require_ids(&[actor_id, other_id])?;
        if actor_id == other_id {
            return Err(AppError::InvalidSelfAction);
        }
        if !self.store.are_friends(actor_id, other_id).await? {
            return Err(AppError::NotFriends);
        }

        // A concurrent unfriend may have won between the check and the delete
        if !self.store.unfriend(actor_id, other_id).await? {
            return Err(AppError::NotFriends);
        }
        tracing::info!(actor_id, other_id, "Unfriended");
        self.publish(GraphEvent::Unfriended { actor_id, other_id })
            .await;

        Ok(())
    }

    // ==================== Add-friend search ====================

    /// Users the actor could send a friend request to.
    ///
    /// An empty search returns an empty page without querying.
    pub async fn search_addable_users(
        &self,
        actor_id: i64,
        search: &str,
        window: PageRequest,
    ) -> AppResult<Page<UserSearchItem>> {
        require_ids(&[actor_id])?;
        let search = normalize_search(search);
        let window = window.clamp();
        if search.is_empty() {
            return Ok(Page::empty(window));
        }

        let items = self
            .store
            .search_addable_users(actor_id, search, window)
            .await?;
        let total = self.store.count_addable_users(actor_id, search).await?;
        Ok(Page::new(items, total, window))
    }
}
