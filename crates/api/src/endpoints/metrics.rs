//! Metrics endpoints for monitoring and observability.
//!
//! Provides endpoints for:
//! - Prometheus metrics export
//! - Health checks

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use sharegraph_common::MetricsSnapshot;

use crate::middleware::AppState;

/// Create the metrics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(get_metrics_json))
        .route("/metrics/prometheus", get(get_metrics_prometheus))
        .route("/health", get(health_check))
}

/// JSON metrics response.
#[derive(Serialize)]
pub struct MetricsResponse {
    pub http: HttpMetrics,
    pub graph: GraphMetrics,
    pub recommend: RecommendMetrics,
}

#[derive(Serialize)]
pub struct HttpMetrics {
    pub requests_total: u64,
    pub requests_active: u64,
    pub requests_2xx: u64,
    pub requests_4xx: u64,
    pub requests_5xx: u64,
    pub latency_avg_us: u64,
}

#[derive(Serialize)]
pub struct GraphMetrics {
    pub follows_created: u64,
    pub friend_requests_sent: u64,
    pub friend_requests_accepted: u64,
    pub unfriends: u64,
}

#[derive(Serialize)]
pub struct RecommendMetrics {
    pub served: u64,
    pub fallbacks: u64,
}

impl From<MetricsSnapshot> for MetricsResponse {
    fn from(s: MetricsSnapshot) -> Self {
        Self {
            http: HttpMetrics {
                requests_total: s.http_requests_total,
                requests_active: s.http_requests_active,
                requests_2xx: s.http_requests_2xx,
                requests_4xx: s.http_requests_4xx,
                requests_5xx: s.http_requests_5xx,
                latency_avg_us: s.http_request_latency_avg_us,
            },
            graph: GraphMetrics {
                follows_created: s.follows_created,
                friend_requests_sent: s.friend_requests_sent,
                friend_requests_accepted: s.friend_requests_accepted,
                unfriends: s.unfriends,
            },
            recommend: RecommendMetrics {
                served: s.recommendations_served,
                fallbacks: s.recommendation_fallbacks,
            },
        }
    }
}

/// Get metrics in JSON format.
async fn get_metrics_json(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse::from(state.metrics.snapshot()))
}

/// Get metrics in Prometheus text format.
async fn get_metrics_prometheus(State(state): State<AppState>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.metrics.to_prometheus(),
    )
        .into_response()
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Simple health check (liveness probe).
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_response_from_snapshot() {
        let snapshot = MetricsSnapshot {
            http_requests_total: 100,
            http_requests_active: 5,
            http_requests_2xx: 90,
            http_requests_4xx: 8,
            http_requests_5xx: 2,
            http_request_latency_avg_us: 1500,
            follows_created: 12,
            friend_requests_sent: 7,
            friend_requests_accepted: 4,
            unfriends: 1,
            recommendations_served: 30,
            recommendation_fallbacks: 9,
        };

        let response = MetricsResponse::from(snapshot);

        assert_eq!(response.http.requests_total, 100);
        assert_eq!(response.http.latency_avg_us, 1500);
        assert_eq!(response.graph.friend_requests_accepted, 4);
        assert_eq!(response.recommend.fallbacks, 9);
    }
}
