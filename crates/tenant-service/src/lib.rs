pub mod routes;
pub mod state;
pub mod webhook_dispatch;

pub use state::AppState;

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Owns §4.1: tenant CRUD, settings, webhooks. Publishes `tenant.deleted`
/// on delete; every other service consumes it.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(svc_common::health::health))
        .route("/ready", get(svc_common::health::ready))
        .route("/metrics", get(svc_common::health::metrics))
        .route("/tenants/", get(routes::tenants::list_tenants).post(routes::tenants::create_tenant))
        .route(
            "/tenants/:id",
            get(routes::tenants::get_tenant)
                .put(routes::tenants::update_tenant)
                .delete(routes::tenants::delete_tenant),
        )
        .route(
            "/tenants/:id/settings",
            get(routes::tenants::get_settings).put(routes::tenants::update_settings),
        )
        .route(
            "/tenants/:id/webhooks",
            get(routes::webhooks::list_webhooks).post(routes::webhooks::create_webhook),
        )
        .route(
            "/tenants/:id/webhooks/:webhook_id",
            put(routes::webhooks::update_webhook).delete(routes::webhooks::delete_webhook),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
