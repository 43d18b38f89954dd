use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, satellites, sources, tle};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let static_dir = state.config().server.static_dir.clone();

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // TLE records
        .route("/tle", get(tle::list_recent))
        .route("/tle/satellite/{catalog_id}", get(tle::by_satellite))
        .route("/tle/{id}", delete(tle::delete_record))
        .route("/tle/update", post(tle::update_batch))
        .route("/tle/auto-update", post(tle::auto_update))
        // TLE sources
        .route(
            "/tle/sources",
            get(sources::list_sources).post(sources::add_source),
        )
        // Satellite roster
        .route(
            "/satellites",
            get(satellites::list_satellites).post(satellites::add_satellite),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state))
        .fallback_service(ServeDir::new(static_dir))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
