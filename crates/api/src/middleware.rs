//! API middleware.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use sharegraph_common::{
    Metrics, Timer,
    config::{AuthConfig, RecommendConfig},
};
use sharegraph_core::{FriendService, RecommendService};

use crate::extractors::Actor;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Follow graph and friend requests.
    pub friend_service: FriendService,
    /// Post recommendations.
    pub recommend_service: RecommendService,
    /// Request and domain counters.
    pub metrics: Arc<Metrics>,
    /// Where the upstream identity provider puts the actor id.
    pub auth: AuthConfig,
    /// Limit policy for `/recommend`.
    pub recommend: RecommendConfig,
}

/// Actor middleware.
///
/// Trusts the configured header set by the upstream identity provider. A
/// missing, unparseable or non-positive value leaves the request anonymous.
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let actor = req
        .headers()
        .get(state.auth.actor_header.as_str())
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|id| *id > 0);

    if let Some(actor_id) = actor {
        req.extensions_mut().insert(Actor(actor_id));
    }

    next.run(req).await
}

/// Metrics middleware: counts requests by status class and accumulates latency.
pub async fn metrics_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let timer = Timer::start();
    state.metrics.start_request();

    let response = next.run(req).await;

    state.metrics.end_request();
    state
        .metrics
        .record_http_request(response.status().as_u16(), timer.elapsed());
    response
}
