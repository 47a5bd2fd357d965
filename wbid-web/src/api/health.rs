//! Health check endpoint
//!
//! Reports whether the catalog database answers and how many species the
//! loaded classifier knows. A database failure turns the response into a
//! 503 so supervisors restart or alert.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;
use wbid_common::db::pending::count_pending;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub build: &'static str,
    pub uptime_seconds: u64,
    pub database: &'static str,
    pub classifier_classes: usize,
    /// Observations awaiting review; absent when the database is down
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_reviews: Option<i64>,
}

/// GET /health
///
/// No authentication; used by process supervisors.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let pending_reviews = match count_pending(&state.db).await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Health check database query failed: {}", e);
            None
        }
    };

    let (code, status, database) = match pending_reviews {
        Some(_) => (StatusCode::OK, "ok", "ok"),
        None => (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable"),
    };

    (
        code,
        Json(HealthResponse {
            status,
            module: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            build: env!("GIT_HASH"),
            uptime_seconds: state.startup_time.elapsed().as_secs(),
            database,
            classifier_classes: state.classifier.class_count(),
            pending_reviews,
        }),
    )
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
