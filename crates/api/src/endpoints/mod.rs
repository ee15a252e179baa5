//! API endpoints.

#![allow(missing_docs)]

mod metrics;
mod recommend;
mod social;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/social", social::router())
        .merge(recommend::router())
        .merge(metrics::router())
}
