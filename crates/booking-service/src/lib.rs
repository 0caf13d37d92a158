pub mod admission;
pub mod consumer;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::{
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Owns §4.4: the booking admission algorithm, recurrence expansion, and
/// cancellation. Publishes `booking.created/updated/cancelled/status_changed`;
/// consumes `deletion-events` to cascade-cancel or hard-delete.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(svc_common::health::health))
        .route("/ready", get(svc_common::health::ready))
        .route("/metrics", get(svc_common::health::metrics))
        .route(
            "/bookings/",
            get(routes::bookings::list_bookings).post(routes::bookings::create_booking),
        )
        .route(
            "/bookings/:id",
            get(routes::bookings::get_booking)
                .put(routes::bookings::update_booking)
                .delete(routes::bookings::delete_booking),
        )
        .route("/bookings/:id/cancel", patch(routes::bookings::cancel_booking))
        .route("/internal/bookings/active", get(routes::internal::list_active_bookings))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
