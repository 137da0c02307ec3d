//! Health check endpoints.
//!
//! `/` reports overall health including the database, `/ready` gates traffic
//! on database connectivity, `/live` only proves the process is responsive.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::app::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
}

#[derive(Debug, Serialize)]
struct DatabaseHealth {
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness))
        .route("/live", get(liveness))
}

async fn check_database(state: &AppState) -> DatabaseHealth {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => DatabaseHealth {
            healthy: true,
            error: None,
        },
        Err(e) => DatabaseHealth {
            healthy: false,
            error: Some(e.to_string()),
        },
    }
}

async fn health_check(State(state): State<AppState>) -> Response {
    let database = check_database(&state).await;
    let healthy = database.healthy;

    let body = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database,
    };

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

async fn readiness(State(state): State<AppState>) -> Response {
    let database = check_database(&state).await;
    if database.healthy {
        (StatusCode::OK, Json(serde_json::json!({"ready": true}))).into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"ready": false})),
        )
            .into_response()
    }
}

async fn liveness() -> Response {
    (StatusCode::OK, Json(serde_json::json!({"alive": true}))).into_response()
}
