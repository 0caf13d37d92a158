use std::time::Duration;
use svc_common::config::CoreConfig;
use svc_common::http_client::InternalServiceClient;
use svc_common::telemetry::{init_metrics, init_tracing};
use user_service::{create_app, AppState};

#[tokio::main]
async fn main() {
    let config = CoreConfig::from_env();
    let migrate_only = std::env::args().any(|arg| arg == "--migrate-only");

    let metrics_handle = init_metrics();
    init_tracing("user_service");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    tracing::info!("running database migrations");
    sqlx::migrate!("../../migrations/user-service")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    if migrate_only {
        tracing::info!("migration-only mode, exiting");
        return;
    }

    let tenant_service_url = CoreConfig::peer_url("TENANT_SERVICE_URL");
    let tenant_client = InternalServiceClient::new(tenant_service_url, Duration::from_secs(5));

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        jwt_expiry_hours: config.jwt_expiry_hours,
        tenant_client,
        metrics_handle,
    };

    tokio::spawn(user_service::consumer::run(pool, config.redis_url.clone()));

    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("user-service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
