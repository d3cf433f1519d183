//! Health check endpoints
//!
//! - /health - Basic health check
//! - /health/ready - Readiness probe (pings both stores)
//! - /health/live - Liveness probe

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Serialize)]
pub struct HealthChecks {
    pub credentials: CheckStatus,
    pub blacklist: CheckStatus,
}

/// Status of an individual check
#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckStatus {
    fn from_result(result: anyhow::Result<()>) -> Self {
        match result {
            Ok(()) => CheckStatus {
                status: "healthy".to_string(),
                message: None,
            },
            Err(e) => CheckStatus {
                status: "unhealthy".to_string(),
                message: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    })
}

/// Readiness probe. 503 if either store is unreachable.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (users, blacklist) = tokio::join!(state.users.ping(), state.blacklist.ping());
    let checks = HealthChecks {
        credentials: CheckStatus::from_result(users),
        blacklist: CheckStatus::from_result(blacklist),
    };
    let is_healthy = checks.credentials.is_healthy() && checks.blacklist.is_healthy();

    let response = HealthResponse {
        status: if is_healthy { "ready" } else { "not_ready" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
    };

    if is_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe. Always OK while the process is serving.
pub async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "alive".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    })
}
