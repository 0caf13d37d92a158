use axum::{extract::State, http::header::CONTENT_TYPE, response::IntoResponse, Json};
use serde_json::json;
use sqlx::PgPool;

/// Liveness: the process is up. Never touches the database.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Readiness: the process can actually serve traffic — its database pool
/// answers a trivial query. Used by the orchestrator to gate traffic, not
/// by callers deciding whether to retry.
pub async fn ready(State(pool): State<PgPool>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").execute(&pool).await {
        Ok(_) => (axum::http::StatusCode::OK, Json(json!({ "status": "ready" }))),
        Err(err) => {
            tracing::warn!("readiness check failed: {err}");
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "not_ready" })),
            )
        }
    }
}

/// Renders the installed Prometheus recorder's metrics in exposition format.
pub async fn metrics(State(handle): State<metrics_exporter_prometheus::PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], handle.render())
}
