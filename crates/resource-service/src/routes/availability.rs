use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use db::ResourceRepository;
use domain::availability::{AvailabilityEngine, AvailableSlot, BookingInterval};
use serde::{Deserialize, Serialize};
use shared::types::{BookingId, OrganizationSettings, ResourceId};
use shared::{AppError, DomainError};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize)]
struct ActiveBookingDto {
    id: BookingId,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
}

/// The `{timezone, slots}` envelope the availability contract specifies —
/// callers need the tenant's timezone to render `slots` (UTC instants)
/// against local wall-clock time.
#[derive(Debug, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub timezone: String,
    pub slots: Vec<AvailableSlot>,
}

/// Projects a resource's open slots for one calendar date, per the
/// availability projection algorithm: tenant settings and committed bookings
/// are both resolved from neighbouring services (cache-first), then
/// `AvailabilityEngine::project` does the pure computation.
pub async fn get_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ResourceId>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let cache_key = events::RedisCache::availability_key(&id.to_string(), &query.date.to_string());
    if let Some(cached) = state.cache.get::<AvailabilityResponse>(&cache_key).await {
        return Ok(Json(cached));
    }

    let resource = ResourceRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::ResourceNotFound(id.to_string())))?;

    let settings = resolve_settings(&state, auth.tenant_id).await;

    let bookings = resolve_active_bookings(&state, auth.tenant_id, id, query.date).await;

    let slots = AvailabilityEngine::project(&resource.weekly_schedule(), &settings, query.date, &bookings)
        .map_err(|e| ApiError::from(AppError::Validation(e.to_string())))?;

    let response = AvailabilityResponse {
        timezone: settings.timezone,
        slots,
    };

    state
        .cache
        .set(&cache_key, &response, state.cache_ttl_availability)
        .await;

    Ok(Json(response))
}

async fn resolve_settings(state: &AppState, tenant_id: shared::types::TenantId) -> OrganizationSettings {
    let settings_key = events::RedisCache::settings_key(&tenant_id.to_string());
    if let Some(cached) = state.cache.get::<OrganizationSettings>(&settings_key).await {
        return cached;
    }

    match state
        .tenant_client
        .get_json::<OrganizationSettings>(&format!("/tenants/{tenant_id}/settings"), "")
        .await
    {
        Ok(settings) => {
            state.cache.set(&settings_key, &settings, state.cache_ttl_settings).await;
            settings
        }
        Err(err) => {
            tracing::warn!("tenant-service unreachable resolving settings for {tenant_id}, using defaults: {err}");
            OrganizationSettings::defaults()
        }
    }
}

async fn resolve_active_bookings(
    state: &AppState,
    tenant_id: shared::types::TenantId,
    resource_id: ResourceId,
    date: NaiveDate,
) -> Vec<BookingInterval> {
    let path = format!("/internal/bookings/active?tenant_id={tenant_id}&resource_id={resource_id}&date={date}");
    match state.booking_client.get_json::<Vec<ActiveBookingDto>>(&path, "").await {
        Ok(bookings) => bookings
            .into_iter()
            .map(|b| BookingInterval::new(b.id, b.start_time, b.end_time))
            .collect(),
        Err(err) => {
            tracing::warn!("booking-service unreachable resolving active bookings for {resource_id}: {err}");
            Vec::new()
        }
    }
}
