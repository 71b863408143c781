//! Health check handler

use std::sync::Arc;

use axum::extract::State;
use chrono::Local;
use common::model::record::iso8601;

use crate::api::response::{HealthResponse, ResponseStatus};
use crate::AppState;

/// Service health
///
/// Never touches the terminal.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> HealthResponse {
    HealthResponse {
        status: ResponseStatus::Healthy,
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: iso8601(&Local::now().naive_local()),
    }
}
