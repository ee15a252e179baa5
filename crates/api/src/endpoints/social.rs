//! Social graph endpoints: follows, friends and friend requests.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use sharegraph_common::{AppResult, Page};
use sharegraph_db::models::{FollowStats, PendingRequestItem, UserSearchItem, UserSummary};
use validator::Validate;

use crate::{
    extractors::{AuthActor, ListQuery, MaybeActor},
    middleware::AppState,
    response::{ApiResponse, ok},
};

/// Create the social router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follow))
        .route("/follow/{id}", get(is_following).delete(unfollow))
        .route("/friends/{id}", get(list_friends).delete(unfriend))
        .route("/friends/{id}/status", get(friend_status))
        .route("/followers/{id}", get(list_followers))
        .route("/following/{id}", get(list_following))
        .route("/stats/{id}", get(follow_stats))
        .route("/requests", post(send_request))
        .route("/requests/incoming", get(incoming_requests))
        .route("/requests/outgoing", get(outgoing_requests))
        .route("/requests/{id}/accept", post(accept_request))
        .route("/requests/{id}/decline", post(decline_request))
        .route("/requests/{id}", delete(cancel_request))
        .route("/addfriends", get(search_addable))
}

// ==================== Follows ====================

/// Follow request body.
#[derive(Debug, Deserialize)]
pub struct FollowBody {
    pub followed_user_id: i64,
}

/// Follow a user.
async fn follow(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Json(body): Json<FollowBody>,
) -> AppResult<impl IntoResponse> {
    if state
        .friend_service
        .follow(actor_id, body.followed_user_id)
        .await?
    {
        state.metrics.record_follow_created();
    }
    Ok(ok())
}

/// Unfollow a user.
async fn unfollow(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.friend_service.unfollow(actor_id, target_id).await?;
    Ok(ok())
}

/// Following status response.
#[derive(Debug, Serialize)]
pub struct FollowingStatus {
    pub following: bool,
}

/// Check whether the actor follows a user.
async fn is_following(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(target_id): Path<i64>,
) -> AppResult<ApiResponse<FollowingStatus>> {
    let following = state
        .friend_service
        .is_following(actor_id, target_id)
        .await?;
    Ok(ApiResponse::ok(FollowingStatus { following }))
}

/// Friendship status response.
#[derive(Debug, Serialize)]
pub struct FriendStatus {
    pub friends: bool,
}

/// Check whether the actor and a user are friends.
async fn friend_status(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(other_id): Path<i64>,
) -> AppResult<ApiResponse<FriendStatus>> {
    let friends = state.friend_service.are_friends(actor_id, other_id).await?;
    Ok(ApiResponse::ok(FriendStatus { friends }))
}

// ==================== Listings ====================

/// List a user's friends. Anonymous viewers see no relationship flags.
async fn list_friends(
    MaybeActor(viewer): MaybeActor,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<UserSummary>>> {
    query.validate()?;
    let page = state
        .friend_service
        .list_friends(viewer.unwrap_or(0), user_id, &query.search, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// List the actor's followers.
async fn list_followers(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<UserSummary>>> {
    query.validate()?;
    let page = state
        .friend_service
        .list_followers(actor_id, user_id, &query.search, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// List the users the actor follows.
async fn list_following(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<UserSummary>>> {
    query.validate()?;
    let page = state
        .friend_service
        .list_following(actor_id, user_id, &query.search, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Public follower/following/friend counts.
async fn follow_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<FollowStats>> {
    let stats = state.friend_service.get_follow_stats(user_id).await?;
    Ok(ApiResponse::ok(stats))
}

// ==================== Friend requests ====================

/// Friend request body.
#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub to_user_id: i64,
}

/// Created friend request response.
#[derive(Debug, Serialize)]
pub struct SentRequest {
    pub request_id: i64,
}

/// Send a friend request.
async fn send_request(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Json(body): Json<SendRequestBody>,
) -> AppResult<ApiResponse<SentRequest>> {
    let request_id = state
        .friend_service
        .send_friend_request(actor_id, body.to_user_id)
        .await?;
    state.metrics.record_friend_request_sent();
    Ok(ApiResponse::created(SentRequest { request_id }))
}

/// Pending requests addressed to the actor.
async fn incoming_requests(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PendingRequestItem>>> {
    let page = state
        .friend_service
        .list_incoming_requests(actor_id, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Pending requests sent by the actor.
async fn outgoing_requests(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<PendingRequestItem>>> {
    let page = state
        .friend_service
        .list_outgoing_requests(actor_id, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Accept a friend request.
async fn accept_request(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .friend_service
        .accept_friend_request(actor_id, request_id)
        .await?;
    state.metrics.record_friend_request_accepted();
    Ok(ok())
}

/// Decline a friend request.
async fn decline_request(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .friend_service
        .decline_friend_request(actor_id, request_id)
        .await?;
    Ok(ok())
}

/// Cancel a friend request the actor sent.
async fn cancel_request(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state
        .friend_service
        .cancel_friend_request(actor_id, request_id)
        .await?;
    Ok(ok())
}

/// Remove a friendship.
async fn unfriend(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Path(other_id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    state.friend_service.unfriend(actor_id, other_id).await?;
    state.metrics.record_unfriend();
    Ok(ok())
}

/// Users the actor could befriend.
async fn search_addable(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<ApiResponse<Page<UserSearchItem>>> {
    query.validate()?;
    let page = state
        .friend_service
        .search_addable_users(actor_id, &query.search, query.window())
        .await?;
    Ok(ApiResponse::ok(page))
}
