//! Read models returned by the graph and feature stores.
//!
//! These are projections over several tables, shaped for responses rather
//! than for writes.

#![allow(missing_docs)]

use sea_orm::FromQueryResult;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

use crate::entities::post::PostVisibility;

/// A user row in a friends/followers/following listing, annotated with the
/// viewer's relationship to that user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct UserSummary {
    pub user_id: i64,
    pub username: String,
    pub avatar: String,
    /// Viewer and this user are friends
    pub is_friend: bool,
    /// Viewer follows this user
    pub is_following: bool,
}

/// A pending friend request as seen by one side of it.
///
/// `user_id` is the other party: the requester for incoming listings, the
/// addressee for outgoing ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct PendingRequestItem {
    pub request_id: i64,
    pub user_id: i64,
    pub username: String,
    pub avatar: String,
    pub requested_at: DateTimeWithTimeZone,
}

/// A user the actor could send a friend request to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromQueryResult)]
pub struct UserSearchItem {
    pub user_id: i64,
    pub username: String,
    pub avatar: String,
}

/// Public relationship counters for a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FollowStats {
    pub followers: u64,
    pub following: u64,
    pub friends: u64,
}

/// The post a user most recently liked whose document has a finished
/// style vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPost {
    pub post_id: i64,
    pub label: String,
    pub vector: Vec<f64>,
}

/// A post that may be recommended, with its display fields and (when the
/// document has one) its style vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatePost {
    pub post_id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub cover_url: String,
    pub visibility: PostVisibility,
    pub author_name: String,
    pub author_avatar: String,
    pub tags: Vec<String>,
    pub like_count: i64,
    pub is_liked: bool,
    pub is_saved: bool,
    pub created_at: DateTimeWithTimeZone,
    /// Empty when the document has no usable vector
    #[serde(skip)]
    pub vector: Vec<f64>,
}
