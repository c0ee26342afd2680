//! Process-level health endpoint.

use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use krishi_types::{STATUS_OK, ServerHealth};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::routes::route_not_found;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(ServerHealth)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health).fallback(route_not_found))
}

/// Heartbeat endpoint.
///
/// Always HTTP 200. Load-balancers and monitoring systems should poll this.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is running", body = ServerHealth)
    )
)]
pub async fn get_health() -> Json<ServerHealth> {
    Json(ServerHealth {
        status: STATUS_OK.to_owned(),
        message: "Krishi backend is running".to_owned(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────
