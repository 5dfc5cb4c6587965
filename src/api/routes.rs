use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    make_span_with_request_id, request_id_middleware, security_headers_middleware,
};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        // Outside the trace layer so the span can read the ID
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(handlers::recommend))
        .route("/search", post(handlers::search))
        .route("/tracks/:id", get(handlers::track_details))
        .route("/tracks/:id/related", get(handlers::related_tracks))
}
