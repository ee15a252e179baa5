//! API integration tests.
//!
//! These tests drive the router end to end over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use chrono::Utc;
use serde_json::Value;
use sharegraph_api::{AppState, app};
use sharegraph_common::{
    Metrics,
    config::{AuthConfig, RecommendConfig},
};
use sharegraph_core::{FriendService, RecommendService};
use sharegraph_db::InMemoryStore;
use sharegraph_db::entities::post;
use tower::ServiceExt;

/// Create test app state over a seeded in-memory store.
async fn create_test_state() -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    for (id, name) in [(1, "alice"), (2, "bob"), (3, "carol")] {
        store.add_user(id, name, None).await;
    }

    let state = AppState {
        friend_service: FriendService::new(store.clone()),
        recommend_service: RecommendService::new(store.clone(), RecommendConfig::default()),
        metrics: Arc::new(Metrics::new()),
        auth: AuthConfig::default(),
        recommend: RecommendConfig::default(),
    };
    (state, store)
}

async fn send(
    state: &AppState,
    method: &str,
    uri: &str,
    actor: Option<&str>,
    body: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor);
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let (state, _) = create_test_state().await;

    let (status, body) = send(&state, "GET", "/api/v1/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let (state, _) = create_test_state().await;

    let (status, _) = send(&state, "GET", "/api/v1/nonexistent", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_or_invalid_actor_is_unauthorized() {
    let (state, _) = create_test_state().await;
    let body = Some(r#"{"followed_user_id":2}"#);

    let (status, json) = send(&state, "POST", "/api/v1/social/follow", None, body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");

    let (status, _) = send(&state, "POST", "/api/v1/social/follow", Some("abc"), body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&state, "POST", "/api/v1/social/follow", Some("0"), body).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_follow_and_unfollow() {
    let (state, _) = create_test_state().await;
    let body = Some(r#"{"followed_user_id":2}"#);

    let (status, _) = send(&state, "POST", "/api/v1/social/follow", Some("1"), body).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, "POST", "/api/v1/social/follow", Some("1"), body).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, json) = send(&state, "GET", "/api/v1/social/follow/2", Some("1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["following"], true);
    assert_eq!(state.metrics.snapshot().follows_created, 1);

    let (status, _) = send(&state, "DELETE", "/api/v1/social/follow/2", Some("1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, json) = send(&state, "GET", "/api/v1/social/follow/2", Some("1"), None).await;
    assert_eq!(json["data"]["following"], false);
}

#[tokio::test]
async fn test_self_follow_is_rejected() {
    let (state, _) = create_test_state().await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/v1/social/follow",
        Some("1"),
        Some(r#"{"followed_user_id":1}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "INVALID_SELF_ACTION");
}

#[tokio::test]
async fn test_friend_request_lifecycle() {
    let (state, _) = create_test_state().await;

    let (status, json) = send(
        &state,
        "POST",
        "/api/v1/social/requests",
        Some("1"),
        Some(r#"{"to_user_id":2}"#),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = json["data"]["request_id"].as_i64().unwrap();

    let (status, json) = send(
        &state,
        "GET",
        "/api/v1/social/requests/incoming",
        Some("2"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["username"], "alice");

    // Only the addressee may accept
    let accept = format!("/api/v1/social/requests/{request_id}/accept");
    let (status, json) = send(&state, "POST", &accept, Some("1"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error"]["code"], "FORBIDDEN");

    let (status, _) = send(&state, "POST", &accept, Some("2"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, json) = send(
        &state,
        "GET",
        "/api/v1/social/friends/2/status",
        Some("1"),
        None,
    )
    .await;
    assert_eq!(json["data"]["friends"], true);

    let (_, json) = send(&state, "GET", "/api/v1/social/stats/1", None, None).await;
    assert_eq!(json["data"]["friends"], 1);
    assert_eq!(json["data"]["followers"], 1);

    let (status, _) = send(&state, "DELETE", "/api/v1/social/friends/2", Some("1"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, json) =
        send(&state, "DELETE", "/api/v1/social/friends/2", Some("1"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "NOT_FRIENDS");

    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.friend_requests_sent, 1);
    assert_eq!(snapshot.friend_requests_accepted, 1);
    assert_eq!(snapshot.unfriends, 1);
}

#[tokio::test]
async fn test_followers_are_owner_only() {
    let (state, _) = create_test_state().await;

    let (status, _) = send(&state, "GET", "/api/v1/social/followers/2", Some("1"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) = send(
        &state,
        "GET",
        "/api/v1/social/following/1?page=0&size=500",
        Some("1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["size"], 100);
}

#[tokio::test]
async fn test_unparseable_paging_falls_back_to_defaults() {
    let (state, _) = create_test_state().await;

    let (status, json) = send(
        &state,
        "GET",
        "/api/v1/social/friends/1?page=abc&size=xyz",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["page"], 1);
    assert_eq!(json["data"]["size"], 20);
}

#[tokio::test]
async fn test_huge_page_is_clamped() {
    let (state, _) = create_test_state().await;

    let (status, json) = send(
        &state,
        "GET",
        "/api/v1/social/friends/1?page=9223372036854775807&size=100",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["page"], sharegraph_common::pagination::MAX_PAGE);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_search_addable_users() {
    let (state, _) = create_test_state().await;

    let (status, json) = send(
        &state,
        "GET",
        "/api/v1/social/addfriends?search=%20CAR",
        Some("1"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["user_id"], 3);
}

#[tokio::test]
async fn test_overlong_search_is_rejected() {
    let (state, _) = create_test_state().await;
    let uri = format!("/api/v1/social/addfriends?search={}", "a".repeat(101));

    let (status, json) = send(&state, "GET", &uri, Some("1"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recommend_cold_start_uses_default_limit() {
    let (state, store) = create_test_state().await;
    for id in 1..=5 {
        store
            .add_post(
                post::Model {
                    id,
                    author_id: 2,
                    title: format!("post {id}"),
                    description: None,
                    cover_url: None,
                    visibility: post::PostVisibility::Public,
                    document_id: None,
                    like_count: 0,
                    created_at: Utc::now().into(),
                },
                &["poster"],
            )
            .await;
    }

    let (status, json) = send(&state, "GET", "/api/v1/recommend", Some("1"), None).await;

    assert_eq!(status, StatusCode::OK);
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert!(items.iter().all(|item| item.get("score").is_none()));
    assert_eq!(items[0]["tags"][0], "poster");

    let snapshot = state.metrics.snapshot();
    assert_eq!(snapshot.recommendations_served, 1);
    assert_eq!(snapshot.recommendation_fallbacks, 1);
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let (state, _) = create_test_state().await;

    send(&state, "GET", "/api/v1/health", None, None).await;
    send(&state, "GET", "/api/v1/social/follow/2", None, None).await;

    let (status, json) = send(&state, "GET", "/api/v1/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["http"]["requests_2xx"], 1);
    assert_eq!(json["http"]["requests_4xx"], 1);

    let response = app(state.clone())
        .oneshot(
            Request::builder()
                .uri("/api/v1/metrics/prometheus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("sharegraph_http_requests_total"));
}
