use booking_service::{create_app, AppState};
use events::{RedisCache, StreamPublisher};
use std::time::Duration;
use svc_common::config::CoreConfig;
use svc_common::http_client::InternalServiceClient;
use svc_common::telemetry::{init_metrics, init_tracing};

#[tokio::main]
async fn main() {
    let config = CoreConfig::from_env();
    let migrate_only = std::env::args().any(|arg| arg == "--migrate-only");

    let metrics_handle = init_metrics();
    init_tracing("booking_service");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    tracing::info!("running database migrations");
    sqlx::migrate!("../../migrations/booking-service")
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
    let resource_client =
        InternalServiceClient::new(CoreConfig::peer_url("RESOURCE_SERVICE_URL"), Duration::from_secs(5));

    let state = AppState {
        pool: pool.clone(),
        cache,
        publisher: publisher.clone(),
        tenant_client,
        resource_client,
        jwt_secret: config.jwt_secret.clone(),
        cache_ttl_settings: config.cache_ttl_settings,
        metrics_handle,
    };

    tokio::spawn(booking_service::consumer::run(pool, publisher, config.redis_url.clone()));

    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("booking-service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
