use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use db::models::{Booking, CreateBooking, UpdateBooking};
use db::repositories::BookingWriteError;
use db::BookingRepository;
use domain::authz::{authorize, Action};
use domain::booking::{normalize, run_gates, NaiveOrAware, RecurringPattern};
use events::{EventEnvelope, RedisCache};
use serde::{Deserialize, Serialize};
use shared::types::{BookingId, RecurrenceFrequency, ResourceId, UserId};
use shared::{AppError, DomainError, EventKind};
use std::time::Duration;
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::admission;
use crate::state::AppState;

const IDEMPOTENCY_RESERVATION_TTL: Duration = Duration::from_secs(30);
const IDEMPOTENCY_RESULT_TTL: Duration = Duration::from_secs(86_400);

#[derive(Debug, Deserialize)]
pub struct RecurringInput {
    pub frequency: RecurrenceFrequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
    pub days_of_week: Option<Vec<u8>>,
}

fn default_interval() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub resource_id: ResourceId,
    pub client_id: Option<UserId>,
    pub start_time: String,
    pub end_time: String,
    pub notes: Option<String>,
    pub recurring: Option<RecurringInput>,
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub resource_id: Option<ResourceId>,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct ConflictBody {
    pub success: bool,
    pub error: &'static str,
    pub message: String,
    pub conflicts: Vec<ConflictEntry>,
}

/// The `{booking_id, start_time, end_time}` projection of a conflicting row,
/// per the 409 body contract — callers never see the full `Booking`.
#[derive(Debug, Serialize)]
pub struct ConflictEntry {
    pub booking_id: BookingId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<Booking> for ConflictEntry {
    fn from(b: Booking) -> Self {
        ConflictEntry {
            booking_id: b.id,
            start_time: b.start_time,
            end_time: b.end_time,
        }
    }
}

fn conflict_body(conflicts: Vec<Booking>) -> ConflictBody {
    ConflictBody {
        success: false,
        error: "conflict",
        message: format!("conflicts with {} existing booking(s)", conflicts.len()),
        conflicts: conflicts.into_iter().map(ConflictEntry::from).collect(),
    }
}

/// Creates one booking, or (when `recurring` is present) an all-or-nothing
/// batch of occurrences sharing a `recurrence_group_id`. An `Idempotency-Key`
/// header makes a recurring create safe to retry: the first call to claim
/// the key runs the work, replays return the cached result.
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(input): Json<CreateBookingRequest>,
) -> axum::response::Response {
    run_create(&state, &auth, &headers, input).await.into_axum_response()
}

enum CreateOutcome {
    Created(Vec<Booking>),
    Conflict(Vec<Booking>),
    Error(ApiError),
}

impl CreateOutcome {
    fn into_axum_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;
        match self {
            CreateOutcome::Created(bookings) => (StatusCode::CREATED, Json(bookings)).into_response(),
            CreateOutcome::Conflict(conflicts) => (StatusCode::CONFLICT, Json(conflict_body(conflicts))).into_response(),
            CreateOutcome::Error(err) => err.into_response(),
        }
    }
}

async fn run_create(state: &AppState, auth: &AuthUser, headers: &HeaderMap, input: CreateBookingRequest) -> CreateOutcome {
    if !authorize(&auth.domain_claims(), Action::Book, auth.tenant_id, Some(auth.permissions)).is_permit() {
        return CreateOutcome::Error(ApiError::from(AppError::Forbidden));
    }

    let idempotency_key = headers
        .get("Idempotency-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let cache_key = idempotency_key
        .as_ref()
        .map(|key| RedisCache::idempotency_key(&auth.tenant_id.to_string(), key));

    if let Some(ref cache_key) = cache_key {
        if let Some(cached) = state.cache.get::<Vec<Booking>>(cache_key).await {
            return CreateOutcome::Created(cached);
        }
        let claimed = state.cache.set_nx(cache_key, &Vec::<Booking>::new(), IDEMPOTENCY_RESERVATION_TTL).await;
        if !claimed {
            return CreateOutcome::Error(ApiError::from(AppError::Conflict));
        }
    }

    let ctx = match admission::resolve(state, auth.tenant_id, input.resource_id).await {
        Ok(ctx) => ctx,
        Err(err) => return CreateOutcome::Error(err),
    };

    let start = match parse_time_input(&input.start_time) {
        Ok(t) => t,
        Err(err) => return CreateOutcome::Error(err),
    };
    let end = match parse_time_input(&input.end_time) {
        Ok(t) => t,
        Err(err) => return CreateOutcome::Error(err),
    };

    let window = match normalize(start, end, &ctx.tz) {
        Ok(w) => w,
        Err(err) => return CreateOutcome::Error(ApiError::from(err)),
    };

    let now = Utc::now();
    let client_id = input.client_id.unwrap_or(auth.claims_sub);

    let result = match input.recurring {
        None => {
            if let Err(err) = run_gates(window, now, &ctx.settings, &ctx.resource_schedule, &ctx.tz) {
                return CreateOutcome::Error(ApiError::from(err));
            }
            let create = CreateBooking {
                tenant_id: auth.tenant_id,
                resource_id: input.resource_id,
                user_id: auth.claims_sub,
                client_id,
                start_time: window.start,
                end_time: window.end,
                notes: input.notes,
                recurring_enabled: false,
                recurring_pattern: None,
                recurrence_group_id: None,
            };
            BookingRepository::create(&state.pool, create).await.map(|b| vec![b])
        }
        Some(recurring) => {
            let pattern = RecurringPattern {
                frequency: recurring.frequency,
                interval: recurring.interval,
                end_date: recurring.end_date,
                days_of_week: recurring.days_of_week,
            };
            let start_date = window.start.with_timezone(&ctx.tz).date_naive();
            let start_tod = window.start.with_timezone(&ctx.tz).time();
            let end_tod = window.end.with_timezone(&ctx.tz).time();

            let group_id = BookingId::new();
            let mut occurrences = Vec::new();
            for date in pattern.occurrences(start_date) {
                let occ_start = NaiveOrAware::Naive(NaiveDateTime::new(date, start_tod));
                let occ_end = NaiveOrAware::Naive(NaiveDateTime::new(date, end_tod));
                let occ_window = match normalize(occ_start, occ_end, &ctx.tz) {
                    Ok(w) => w,
                    Err(err) => return CreateOutcome::Error(ApiError::from(err)),
                };
                if let Err(err) = run_gates(occ_window, now, &ctx.settings, &ctx.resource_schedule, &ctx.tz) {
                    return CreateOutcome::Error(ApiError::from(err));
                }
                occurrences.push(CreateBooking {
                    tenant_id: auth.tenant_id,
                    resource_id: input.resource_id,
                    user_id: auth.claims_sub,
                    client_id,
                    start_time: occ_window.start,
                    end_time: occ_window.end,
                    notes: input.notes.clone(),
                    recurring_enabled: true,
                    recurring_pattern: Some(pattern.clone()),
                    recurrence_group_id: Some(group_id),
                });
            }
            BookingRepository::create_recurring_batch(&state.pool, occurrences).await
        }
    };

    match result {
        Ok(created) => {
            for booking in &created {
                publish(state, EventKind::BookingCreated, booking).await;
            }
            if let Some(ref cache_key) = cache_key {
                state.cache.set(cache_key, &created, IDEMPOTENCY_RESULT_TTL).await;
            }
            CreateOutcome::Created(created)
        }
        Err(BookingWriteError::Conflict(conflicts)) => {
            if let Some(ref cache_key) = cache_key {
                state.cache.invalidate(cache_key).await;
            }
            CreateOutcome::Conflict(conflicts)
        }
        Err(BookingWriteError::Sqlx(err)) => {
            if let Some(ref cache_key) = cache_key {
                state.cache.invalidate(cache_key).await;
            }
            CreateOutcome::Error(ApiError::from(err))
        }
    }
}

fn parse_time_input(raw: &str) -> Result<NaiveOrAware, ApiError> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(NaiveOrAware::Aware(dt.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(NaiveOrAware::Naive(naive));
    }
    Err(ApiError::from(AppError::Validation(format!(
        "invalid time value: {raw}"
    ))))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListBookingsQuery>,
) -> ApiResult<Json<Vec<Booking>>> {
    // Viewing bookings outside one's own requires ViewAllBookings.
    if query.user_id != Some(auth.claims_sub)
        && !authorize(&auth.domain_claims(), Action::ViewAllBookings, auth.tenant_id, Some(auth.permissions)).is_permit()
    {
        return Err(ApiError::from(AppError::Forbidden));
    }

    let bookings = BookingRepository::list(&state.pool, auth.tenant_id, query.resource_id, query.user_id).await?;
    Ok(Json(bookings))
}

pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> ApiResult<Json<Booking>> {
    let booking = BookingRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::BookingNotFound(id.to_string())))?;

    require_owner_or_view_all(&auth, &booking)?;
    Ok(Json(booking))
}

/// Updates notes/status in place. A PUT that also changes `start_time`,
/// `end_time`, or `resource_id` re-runs the full admission pipeline against
/// the new window (excluding this row from the conflict check) and returns
/// 409 on conflict, exactly like a create.
pub async fn update_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
    Json(input): Json<UpdateBooking>,
) -> axum::response::Response {
    run_update(&state, &auth, id, input).await.into_axum_response()
}

enum UpdateOutcome {
    Updated(Booking),
    Conflict(Vec<Booking>),
    Error(ApiError),
}

impl UpdateOutcome {
    fn into_axum_response(self) -> axum::response::Response {
        use axum::response::IntoResponse;
        match self {
            UpdateOutcome::Updated(booking) => (StatusCode::OK, Json(booking)).into_response(),
            UpdateOutcome::Conflict(conflicts) => (StatusCode::CONFLICT, Json(conflict_body(conflicts))).into_response(),
            UpdateOutcome::Error(err) => err.into_response(),
        }
    }
}

async fn run_update(state: &AppState, auth: &AuthUser, id: BookingId, input: UpdateBooking) -> UpdateOutcome {
    let existing = match BookingRepository::find_by_id(&state.pool, auth.tenant_id, id).await {
        Ok(Some(b)) => b,
        Ok(None) => return UpdateOutcome::Error(ApiError::from(DomainError::BookingNotFound(id.to_string()))),
        Err(err) => return UpdateOutcome::Error(ApiError::from(err)),
    };
    if let Err(err) = require_owner_or_view_all(auth, &existing) {
        return UpdateOutcome::Error(err);
    }

    if let Some(next) = input.status {
        if !existing.status.can_transition_to(next) {
            return UpdateOutcome::Error(ApiError::from(DomainError::InvalidStateTransition));
        }
    }

    let mut current = existing.clone();

    let reschedule = input.start_time.is_some() || input.end_time.is_some() || input.resource_id.is_some();
    if reschedule {
        let resource_id = input.resource_id.unwrap_or(existing.resource_id);

        let ctx = match admission::resolve(state, auth.tenant_id, resource_id).await {
            Ok(ctx) => ctx,
            Err(err) => return UpdateOutcome::Error(err),
        };

        let start = match input.start_time.as_deref().map(parse_time_input).transpose() {
            Ok(Some(t)) => t,
            Ok(None) => NaiveOrAware::Aware(existing.start_time),
            Err(err) => return UpdateOutcome::Error(err),
        };
        let end = match input.end_time.as_deref().map(parse_time_input).transpose() {
            Ok(Some(t)) => t,
            Ok(None) => NaiveOrAware::Aware(existing.end_time),
            Err(err) => return UpdateOutcome::Error(err),
        };

        let window = match normalize(start, end, &ctx.tz) {
            Ok(w) => w,
            Err(err) => return UpdateOutcome::Error(ApiError::from(err)),
        };

        if let Err(err) = run_gates(window, Utc::now(), &ctx.settings, &ctx.resource_schedule, &ctx.tz) {
            return UpdateOutcome::Error(ApiError::from(err));
        }

        current = match BookingRepository::update_time_and_resource(
            &state.pool,
            auth.tenant_id,
            id,
            resource_id,
            window.start,
            window.end,
        )
        .await
        {
            Ok(Some(b)) => b,
            Ok(None) => return UpdateOutcome::Error(ApiError::from(DomainError::BookingNotFound(id.to_string()))),
            Err(BookingWriteError::Conflict(conflicts)) => return UpdateOutcome::Conflict(conflicts),
            Err(BookingWriteError::Sqlx(err)) => return UpdateOutcome::Error(ApiError::from(err)),
        };
    }

    if input.notes.is_some() || input.status.is_some() {
        current = match BookingRepository::update_notes_and_status(&state.pool, auth.tenant_id, id, input).await {
            Ok(Some(b)) => b,
            Ok(None) => return UpdateOutcome::Error(ApiError::from(DomainError::BookingNotFound(id.to_string()))),
            Err(err) => return UpdateOutcome::Error(ApiError::from(err)),
        };
    }

    let booking = current;
    let event = if booking.status != existing.status {
        EventKind::BookingStatusChanged
    } else {
        EventKind::BookingUpdated
    };
    publish(state, event, &booking).await;

    UpdateOutcome::Updated(booking)
}

/// (I6) cancellation is only permitted while `now + cancellation_hours <=
/// start_time`; tenant settings supply `cancellation_hours`.
pub async fn cancel_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> ApiResult<Json<Booking>> {
    let existing = BookingRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::BookingNotFound(id.to_string())))?;
    require_owner_or_view_all(&auth, &existing)?;

    let settings = admission::resolve_settings(&state, auth.tenant_id).await?;
    if !existing.can_cancel(Utc::now(), settings.cancellation_hours) {
        return Err(ApiError::from(DomainError::CancellationWindowViolated {
            min_hours: settings.cancellation_hours,
        }));
    }

    let booking = BookingRepository::cancel(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::BookingNotFound(id.to_string())))?;

    publish(&state, EventKind::BookingCancelled, &booking).await;
    Ok(Json(booking))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<BookingId>,
) -> ApiResult<StatusCode> {
    BookingRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::BookingNotFound(id.to_string())))?;
    require_admin_of_tenant(&auth)?;

    let deleted = BookingRepository::delete(&state.pool, auth.tenant_id, id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::BookingNotFound(id.to_string())));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn require_admin_of_tenant(auth: &AuthUser) -> Result<(), ApiError> {
    let decision = authorize(&auth.domain_claims(), Action::AdminOfTenant, auth.tenant_id, None);
    if decision.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}

fn require_owner_or_view_all(auth: &AuthUser, booking: &Booking) -> Result<(), ApiError> {
    let self_decision = authorize(
        &auth.domain_claims(),
        Action::Self_ { owner: booking.user_id },
        auth.tenant_id,
        None,
    );
    if self_decision.is_permit() {
        return Ok(());
    }
    let view_all = authorize(&auth.domain_claims(), Action::ViewAllBookings, auth.tenant_id, Some(auth.permissions));
    if view_all.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}

async fn publish(state: &AppState, kind: EventKind, booking: &Booking) {
    let envelope = EventEnvelope::new(
        kind,
        booking.tenant_id,
        serde_json::json!({
            "booking_id": booking.id,
            "resource_id": booking.resource_id,
            "user_id": booking.user_id,
            "start_time": booking.start_time,
            "end_time": booking.end_time,
            "status": booking.status,
        }),
        Utc::now(),
    );
    if let Err(err) = state.publisher.publish(kind.stream(), &envelope).await {
        tracing::error!("failed to publish {kind} for booking {}: {err}", booking.id);
    }
    state.cache.invalidate_availability_for_resource(&booking.resource_id.to_string()).await;
}
