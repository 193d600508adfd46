//! Health check handlers.
//!
//! - `/health` - liveness probe, always "OK" while the process serves
//! - `/ready` - readiness probe, pings the database

use crate::routes::AppState;
use axum::{extract::State, http::StatusCode};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /health (liveness probe).
pub async fn health_check() -> &'static str {
    "OK"
}

/// Handler for GET /ready (readiness probe).
///
/// Verifies database connectivity with a trivial query. Returns 503 when
/// the database is unreachable so load balancers stop routing here.
#[instrument(skip_all, name = "casting.handlers.ready")]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, StatusCode> {
    match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => Ok("ready"),
        Err(e) => {
            tracing::warn!(target: "casting.handlers.health", error = %e, "Readiness check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
