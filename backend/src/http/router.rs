//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, compression, tracing).

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// Collection endpoints answer both with and without a trailing slash.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let coils = get(handlers::list_coils).post(handlers::create_coil);
    let statistics = get(handlers::get_statistics);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/coils", coils.clone())
        .route("/coils/", coils)
        .route("/coils/{id}", delete(handlers::remove_coil))
        .route("/statistics", statistics.clone())
        .route("/statistics/", statistics)
        .fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
