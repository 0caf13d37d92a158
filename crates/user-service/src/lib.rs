pub mod consumer;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Owns §4.2: user accounts, login, and permissions. Consumes `tenant.deleted`
/// to cascade-delete its own rows; publishes nothing.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(svc_common::health::health))
        .route("/ready", get(svc_common::health::ready))
        .route("/metrics", get(svc_common::health::metrics))
        .route("/auth/login", axum::routing::post(routes::auth::login))
        .route("/users/me", get(routes::users::me))
        .route("/users/", get(routes::users::list_users).post(routes::users::create_user))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
