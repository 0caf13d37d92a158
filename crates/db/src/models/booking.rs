use chrono::{DateTime, Utc};
use domain::booking::RecurringPattern;
use serde::{Deserialize, Serialize};
use shared::types::{BookingId, BookingStatus, ResourceId, TenantId, UserId};
use sqlx::FromRow;

/// A reservation of a resource over `[start_time, end_time)`.
///
/// `user_id` is the caller who created the booking (the authorization
/// owner); `client_id` is the end customer the reservation is for — the
/// same person for self-service bookings, distinct when staff books on a
/// client's behalf.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub tenant_id: TenantId,
    pub resource_id: ResourceId,
    pub user_id: UserId,
    pub client_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: BookingStatus,
    pub notes: Option<String>,
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<sqlx::types::Json<RecurringPattern>>,
    pub recurrence_group_id: Option<BookingId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    /// (I6) whether cancellation is currently permitted.
    pub fn can_cancel(&self, now: DateTime<Utc>, cancellation_hours: i32) -> bool {
        self.status.is_active() && domain::booking::can_cancel(self.start_time, now, cancellation_hours)
    }
}

/// Input for creating a single booking occurrence. For a recurring create,
/// the booking service builds one of these per generated occurrence date,
/// sharing `recurrence_group_id`.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub tenant_id: TenantId,
    pub resource_id: ResourceId,
    pub user_id: UserId,
    pub client_id: UserId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub recurring_enabled: bool,
    pub recurring_pattern: Option<RecurringPattern>,
    pub recurrence_group_id: Option<BookingId>,
}

/// A PUT may change `notes`/`status` without touching the booking's window,
/// or it may change `start_time`/`end_time`/`resource_id`, in which case the
/// caller must re-run the admission pipeline before applying it.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBooking {
    pub notes: Option<String>,
    pub status: Option<BookingStatus>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub resource_id: Option<ResourceId>,
}
