//! Route table and shared state for the HTTP surface.

use std::sync::Arc;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use services::ForumService;

use crate::handlers;
use crate::metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForumService>,
    pub metrics: Arc<ApiMetrics>,
}

pub fn build_router(service: Arc<ForumService>) -> Router {
    let state = AppState {
        service,
        metrics: Arc::new(ApiMetrics::new()),
    };
    Router::new()
        .route("/api/accounts", post(handlers::register))
        .route("/api/accounts/{id}", get(handlers::get_account))
        .route("/api/accounts/{id}/ban", post(handlers::set_ban))
        .route("/api/sections", get(handlers::list_sections))
        .route(
            "/api/forums/{id}/threads",
            get(handlers::list_threads).post(handlers::create_thread),
        )
        .route(
            "/api/threads/{id}",
            get(handlers::get_thread).delete(handlers::delete_thread),
        )
        .route("/api/threads/{id}/pin", put(handlers::set_pin))
        .route("/api/threads/{id}/responses", post(handlers::create_response))
        .route(
            "/api/responses/{id}",
            patch(handlers::edit_response).delete(handlers::delete_response),
        )
        .route("/api/responses/{id}/vote", put(handlers::vote))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// One counter increment per handled request, labelled by the matched route
/// so path parameters don't explode cardinality.
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let response = next.run(request).await;
    state
        .metrics
        .observe(&method, &route, response.status().as_u16());
    response
}
