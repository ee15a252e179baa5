//! Event publisher service.
//!
//! Provides an abstraction for publishing graph events to side channels
//! (notifications, mail, feeds). Publishing is best-effort: callers log a
//! failure and carry on.

use async_trait::async_trait;
use serde::Serialize;
use sharegraph_common::AppResult;
use std::sync::Arc;

/// Event types emitted after a graph write commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GraphEvent {
    /// A user followed another user.
    Followed { follower_id: i64, followee_id: i64 },
    /// A user unfollowed another user.
    Unfollowed { follower_id: i64, followee_id: i64 },
    /// A friend request was sent.
    FriendRequestSent {
        request_id: i64,
        requester_id: i64,
        addressee_id: i64,
    },
    /// A friend request was accepted and the friendship created.
    FriendRequestAccepted {
        request_id: i64,
        requester_id: i64,
        addressee_id: i64,
    },
    /// A friend request was declined.
    FriendRequestDeclined { request_id: i64, addressee_id: i64 },
    /// A friendship was removed.
    Unfriended { actor_id: i64, other_id: i64 },
}

impl GraphEvent {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Followed { .. } => "followed",
            Self::Unfollowed { .. } => "unfollowed",
            Self::FriendRequestSent { .. } => "friend_request_sent",
            Self::FriendRequestAccepted { .. } => "friend_request_accepted",
            Self::FriendRequestDeclined { .. } => "friend_request_declined",
            Self::Unfriended { .. } => "unfriended",
        }
    }
}

/// Trait for publishing graph events.
///
/// This allows the core services to publish events
/// without depending on any particular delivery mechanism.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event.
    async fn publish(&self, event: &GraphEvent) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when side channels are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: &GraphEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Publishes events as structured `tracing` records.
#[derive(Clone, Default)]
pub struct LogEventPublisher;

#[async_trait]
impl EventPublisher for LogEventPublisher {
    async fn publish(&self, event: &GraphEvent) -> AppResult<()> {
        let payload = serde_json::to_string(event)
            .map_err(|e| sharegraph_common::AppError::Internal(e.to_string()))?;
        tracing::info!(event = event.name(), payload = %payload, "Graph event");
        Ok(())
    }
}

/// Wrapper for boxed `EventPublisher` trait object.
pub type EventPublisherService = Arc<dyn EventPublisher>;
