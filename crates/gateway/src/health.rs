use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::{AppState, ROUTES};

const PEER_HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Readiness for a proxy means its peers are reachable, not that it holds
/// any state of its own. A single unreachable peer still fails readiness —
/// an orchestrator should stop routing traffic here until every prefix
/// resolves again.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut unreachable = Vec::new();
    let mut seen = Vec::new();
    for route in ROUTES {
        let base = (route.upstream)(&state.config);
        if seen.contains(&base) {
            continue;
        }
        seen.push(base);

        let url = format!("{base}/health");
        let reachable = state
            .client
            .get(&url)
            .timeout(PEER_HEALTH_TIMEOUT)
            .send()
            .await
            .map(|resp| resp.status().is_success())
            .unwrap_or(false);

        if !reachable {
            unreachable.push(base.to_string());
        }
    }

    if unreachable.is_empty() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        tracing::warn!("gateway readiness check found unreachable peers: {unreachable:?}");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "not_ready", "unreachable": unreachable })),
        )
    }
}
