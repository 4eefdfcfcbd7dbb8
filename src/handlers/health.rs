use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyzResponse {
    pub status: &'static str,
    pub checks: ReadyzChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyzChecks {
    pub database: bool,
    pub migrations: bool,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "vyze-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    let database = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .is_ok();

    // Applied migrations are recorded by sqlx; a failed one leaves success = false
    let migrations = database
        && sqlx::query_scalar::<_, bool>(
            "SELECT COUNT(*) > 0 AND bool_and(success) FROM _sqlx_migrations",
        )
        .fetch_one(&state.db)
        .await
        .unwrap_or(false);

    let ready = database && migrations;
    if !ready {
        tracing::warn!(database, migrations, "Readiness check failed");
    }

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadyzResponse {
            status: if ready { "ready" } else { "not_ready" },
            checks: ReadyzChecks {
                database,
                migrations,
            },
        }),
    )
}
