//! HTTP API layer for sharegraph.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: social graph, friend requests, recommendations, metrics
//! - **Extractors**: trusted actor, pagination queries
//! - **Middleware**: actor handoff, request metrics
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::AppState;

/// Versioned API with the actor and metrics middleware applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", router())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::actor_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .with_state(state)
}
