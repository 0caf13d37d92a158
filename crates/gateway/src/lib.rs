pub mod config;
pub mod health;
pub mod proxy;
pub mod state;

pub use state::AppState;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// The one stateless member of the system: a path-prefixed reverse proxy in
/// front of tenant/user/resource/booking-service (§6). Carries no
/// authentication or business logic of its own — every downstream service
/// verifies its own bearer token.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(svc_common::health::health))
        .route("/ready", get(health::ready))
        .route("/metrics", get(svc_common::health::metrics))
        .route("/tenants", any(proxy::proxy))
        .route("/tenants/*rest", any(proxy::proxy))
        .route("/users", any(proxy::proxy))
        .route("/users/*rest", any(proxy::proxy))
        .route("/categories", any(proxy::proxy))
        .route("/categories/*rest", any(proxy::proxy))
        .route("/resources", any(proxy::proxy))
        .route("/resources/*rest", any(proxy::proxy))
        .route("/bookings", any(proxy::proxy))
        .route("/bookings/*rest", any(proxy::proxy))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
