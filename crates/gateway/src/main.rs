use std::time::Duration;

use gateway::{config::GatewayConfig, create_app, AppState};
use reqwest::Client;
use svc_common::telemetry::{init_metrics, init_tracing};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() {
    let config = GatewayConfig::from_env();
    let metrics_handle = init_metrics();
    init_tracing("gateway");

    let client = Client::builder()
        .timeout(UPSTREAM_TIMEOUT)
        .build()
        .expect("reqwest client configuration is static and always valid");

    let state = AppState { client, config: config.clone(), metrics_handle };
    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("gateway listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
