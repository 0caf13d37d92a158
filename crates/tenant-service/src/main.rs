use events::{RedisCache, StreamPublisher};
use svc_common::config::CoreConfig;
use svc_common::telemetry::{init_metrics, init_tracing};
use tenant_service::{create_app, AppState};

#[tokio::main]
async fn main() {
    let config = CoreConfig::from_env();
    let migrate_only = std::env::args().any(|arg| arg == "--migrate-only");

    let metrics_handle = init_metrics();
    init_tracing("tenant_service");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");

    tracing::info!("running database migrations");
    sqlx::migrate!("../../migrations/tenant-service")
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

    tokio::spawn(tenant_service::webhook_dispatch::run(pool.clone(), config.redis_url.clone()));

    let state = AppState {
        pool,
        cache,
        publisher,
        jwt_secret: config.jwt_secret.clone(),
        metrics_handle,
    };

    let app = create_app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("tenant-service listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
