use axum::extract::FromRef;
use events::{RedisCache, StreamPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use svc_common::auth::JwtSecretProvider;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: RedisCache,
    pub publisher: StreamPublisher,
    pub jwt_secret: String,
    pub metrics_handle: PrometheusHandle,
}

impl JwtSecretProvider for AppState {
    fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for PrometheusHandle {
    fn from_ref(state: &AppState) -> Self {
        state.metrics_handle.clone()
    }
}
