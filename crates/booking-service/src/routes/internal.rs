use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, TimeZone, Utc};
use db::BookingRepository;
use serde::{Deserialize, Serialize};
use shared::types::{BookingId, ResourceId, TenantId};
use svc_common::error::ApiResult;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActiveBookingsQuery {
    pub tenant_id: TenantId,
    pub resource_id: ResourceId,
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct ActiveBookingDto {
    pub id: BookingId,
    pub start_time: chrono::DateTime<Utc>,
    pub end_time: chrono::DateTime<Utc>,
}

/// Unauthenticated, service-to-service lookup used by resource-service's
/// availability projection: the caller already holds a verified `tenant_id`
/// from its own request, so this trades the bearer token for that claim
/// directly. The UTC day spanned by `date` is widened by a day on each side
/// before the query, since a booking in one UTC calendar day can still
/// overlap a local-time slot on the requested date at a tenant's offset.
pub async fn list_active_bookings(
    State(state): State<AppState>,
    Query(query): Query<ActiveBookingsQuery>,
) -> ApiResult<Json<Vec<ActiveBookingDto>>> {
    let day_start = Utc.from_utc_datetime(&query.date.and_hms_opt(0, 0, 0).unwrap()) - chrono::Duration::days(1);
    let day_end = Utc.from_utc_datetime(&query.date.and_hms_opt(0, 0, 0).unwrap()) + chrono::Duration::days(2);

    let bookings =
        BookingRepository::find_active_in_range(&state.pool, query.tenant_id, query.resource_id, day_start, day_end)
            .await?;

    Ok(Json(
        bookings
            .into_iter()
            .map(|b| ActiveBookingDto {
                id: b.id,
                start_time: b.start_time,
                end_time: b.end_time,
            })
            .collect(),
    ))
}
