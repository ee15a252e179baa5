//! Recommendation endpoint.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use sharegraph_common::AppResult;
use sharegraph_core::RecommendedPost;

use crate::{
    extractors::{AuthActor, lenient_int},
    middleware::AppState,
    response::ApiResponse,
};

/// Create the recommend router.
pub fn router() -> Router<AppState> {
    Router::new().route("/recommend", get(recommend))
}

/// `?limit=` query. An unparseable limit counts as absent.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendQuery {
    pub limit: Option<String>,
}

/// Recommend posts for the actor.
async fn recommend(
    AuthActor(actor_id): AuthActor,
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> AppResult<ApiResponse<Vec<RecommendedPost>>> {
    let limit = state.recommend.resolve_limit(lenient_int(query.limit.as_deref()));
    let posts = state
        .recommend_service
        .recommend_for_user(actor_id, limit)
        .await?;

    state
        .metrics
        .record_recommendation(posts.iter().any(RecommendedPost::is_fallback));
    tracing::debug!(actor_id, limit, count = posts.len(), "Served recommendations");

    Ok(ApiResponse::ok(posts))
}
