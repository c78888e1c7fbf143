//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Memory listing + injection
        .route(
            "/users/{user_id}/memories",
            get(handlers::memory::list_memories),
        )
        .route(
            "/users/{user_id}/memories/context",
            get(handlers::memory::get_context_memories),
        )
        // Settings
        .route(
            "/users/{user_id}/memories/settings",
            put(handlers::memory::set_memory_settings),
        )
        // Mutations
        .route(
            "/users/{user_id}/memories/{id}",
            patch(handlers::memory::edit_memory),
        )
        .route(
            "/users/{user_id}/memories/{id}",
            delete(handlers::memory::delete_memory),
        )
        // Background extraction scheduling
        .route(
            "/extractions",
            post(handlers::extraction::schedule_extraction),
        );

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
