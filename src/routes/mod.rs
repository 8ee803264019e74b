//! Route table for the quiz service.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Rounds, scenarios and stats under `/api/v1`, the same round operations on `/ws`.
/// Permissive CORS and one INFO span per request.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/scenarios", get(http::http_list_scenarios))
        .route("/api/v1/scenarios/reload", post(http::http_reload_scenarios))
        .route("/api/v1/rounds", post(http::http_start_round))
        .route("/api/v1/rounds/:id/next", get(http::http_next_prompt))
        .route("/api/v1/rounds/:id/answer", post(http::http_submit_answer))
        .route("/api/v1/stats", get(http::http_stats))
        .route("/api/v1/stats/weak-spots", get(http::http_weak_spots))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
