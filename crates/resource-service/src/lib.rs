pub mod consumer;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Owns §4.3: categories, resources, and the availability projection.
/// Publishes `resource.deleted`; consumes `tenant.deleted` and
/// `booking-events` (cache invalidation only).
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(svc_common::health::health))
        .route("/ready", get(svc_common::health::ready))
        .route("/metrics", get(svc_common::health::metrics))
        .route(
            "/categories/",
            get(routes::categories::list_categories).post(routes::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(routes::categories::get_category)
                .put(routes::categories::update_category)
                .delete(routes::categories::delete_category),
        )
        .route(
            "/resources/",
            get(routes::resources::list_resources).post(routes::resources::create_resource),
        )
        .route(
            "/resources/:id",
            get(routes::resources::get_resource)
                .put(routes::resources::update_resource)
                .delete(routes::resources::delete_resource),
        )
        .route("/resources/:id/availability", get(routes::availability::get_availability))
        .route("/internal/resources/:id", get(routes::internal::get_resource_internal))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
