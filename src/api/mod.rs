pub mod metrics;
mod system;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Full application router: the site, the back-office and the operational
/// endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/metrics", get(metrics::metrics_endpoint))
        .merge(crate::ui::create_router(state.clone()))
        .layer(middleware::from_fn(metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
