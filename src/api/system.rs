//! Service health endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::startup::get_system_health;
use crate::AppState;

/// GET /health
///
/// 200 while the site can serve; backend reachability is reported but does
/// not make the site unhealthy.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = get_system_health(&state.config, &state.api).await;
    let code = if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}
