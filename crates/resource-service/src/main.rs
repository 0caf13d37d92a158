use events::{RedisCache, StreamPublisher};
use resource_service::{create_app, AppState};
use std::time::Duration;
use svc_common::config::CoreConfig;
use svc_common::http_client::InternalServiceClient;
use svc_common::telemetry::{init_metrics, init_tracing};

#[tokio::main]
async fn main() {
    let config = CoreConfig::from_env();
    let migrate_only = std::env::args().any(|arg| arg == "--migrate-only");

    let metrics_handle = init_metrics();
    init_tracing("resource_service");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    tracing::info!("running database migrations");
    sqlx::migrate!("../../migrations/resource-service")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    if migrate_only {
        tracing::info!("migration-only mode, exiting");
        return;
    }

    let cache = RedisCache::connect(&config.redis_url)
        .await
        .expect("failed to connect to redis cache");
    let publisher = StreamPublisher::connect(&config.redis_url)
        .await
        .expect("failed to connect redis stream publisher");

    let tenant_client = InternalServiceClient::new(CoreConfig::peer_url("TENANT_SERVICE_URL"), Duration::from_secs(5));
    let booking_client = InternalServiceClient::new(CoreConfig::peer_url("BOOKING_SERVICE_URL"), Duration::from_secs(5));

    let state = AppState {
        pool: pool.clone(),
        cache: cache.clone(),
        publisher,
        tenant_client,
        booking_client,
        jwt_secret: config.jwt_secret.clone(),
        cache_ttl_settings: config.cache_ttl_settings,
        cache_ttl_availability: config.cache_ttl_availability,
        metrics_handle,
    };

    tokio::spawn(resource_service::consumer::run_deletion_events(pool, config.redis_url.clone()));
    tokio::spawn(resource_service::consumer::run_booking_events(cache, config.redis_url.clone()));

    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("resource-service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
