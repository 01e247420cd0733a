//! Web surface of the dashboard
//!
//! Serves the page, the form actions and a health check.

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use handlers::AppState;

pub fn create_router(service: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page
        .route("/", get(handlers::index))
        // Actions
        .route("/actions/query-routes", post(handlers::query_routes))
        .route("/actions/calculate-route", post(handlers::calculate_route))
        .route("/actions/recalculation", post(handlers::toggle_recalculation))
        .route("/actions/presets/:name", post(handlers::apply_preset))
        // Health check
        .route("/api/v1/health", get(handlers::health))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
