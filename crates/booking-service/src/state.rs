use axum::extract::FromRef;
use events::{RedisCache, StreamPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::time::Duration;
use svc_common::auth::JwtSecretProvider;
use svc_common::http_client::InternalServiceClient;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: RedisCache,
    pub publisher: StreamPublisher,
    pub tenant_client: InternalServiceClient,
    pub resource_client: InternalServiceClient,
    pub jwt_secret: String,
    pub cache_ttl_settings: Duration,
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
