use chrono::{DateTime, Utc};
use shared::types::{BookingId, ResourceId, TenantId, UserId};
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use crate::models::{Booking, CreateBooking, UpdateBooking};

/// Failure of a write that runs the transactional conflict check. Kept
/// distinct from a bare `sqlx::Error` so callers can surface the
/// conflicting rows in a 409 response body, per the admission algorithm's
/// step 4 ("abort with conflict and include those rows in the response").
#[derive(Debug, Error)]
pub enum BookingWriteError {
    #[error("booking conflicts with {} existing booking(s)", .0.len())]
    Conflict(Vec<Booking>),
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub struct BookingRepository;

impl BookingRepository {
    /// Lock, conflict-check, and insert a single booking inside one
    /// transaction (the one hard transactional requirement of the system).
    /// The caller has already run the policy gates; this only enforces the
    /// conflict check and commits.
    pub async fn create(pool: &PgPool, input: CreateBooking) -> Result<Booking, BookingWriteError> {
        let mut tx = pool.begin().await?;

        Self::lock_resource(&mut tx, input.resource_id).await?;

        let conflicts = Self::conflicts_in_tx(
            &mut tx,
            input.tenant_id,
            input.resource_id,
            input.start_time,
            input.end_time,
            None,
        )
        .await?;

        if !conflicts.is_empty() {
            tx.rollback().await?;
            return Err(BookingWriteError::Conflict(conflicts));
        }

        let booking = Self::insert_in_tx(&mut tx, input).await?;
        tx.commit().await?;
        Ok(booking)
    }

    /// Batch-create every occurrence of a recurring booking as a single
    /// all-or-nothing transaction: one lock on the resource, then gate
    /// (conflict-check) each occurrence against the same snapshot before
    /// any row is written. If any occurrence conflicts, nothing is written.
    pub async fn create_recurring_batch(
        pool: &PgPool,
        occurrences: Vec<CreateBooking>,
    ) -> Result<Vec<Booking>, BookingWriteError> {
        let Some(resource_id) = occurrences.first().map(|o| o.resource_id) else {
            return Ok(Vec::new());
        };

        let mut tx = pool.begin().await?;
        Self::lock_resource(&mut tx, resource_id).await?;

        for occurrence in &occurrences {
            let conflicts = Self::conflicts_in_tx(
                &mut tx,
                occurrence.tenant_id,
                occurrence.resource_id,
                occurrence.start_time,
                occurrence.end_time,
                None,
            )
            .await?;
            if !conflicts.is_empty() {
                tx.rollback().await?;
                return Err(BookingWriteError::Conflict(conflicts));
            }
        }

        let mut inserted = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            inserted.push(Self::insert_in_tx(&mut tx, occurrence).await?);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn lock_resource(
        tx: &mut Transaction<'_, Postgres>,
        resource_id: ResourceId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(resource_id.as_uuid().to_string())
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Rows of `resource` with an active status overlapping `[start, end)`,
    /// optionally excluding one booking id (for update-in-place re-admission).
    async fn conflicts_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        tenant_id: TenantId,
        resource_id: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<BookingId>,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            FROM bookings
            WHERE resource_id = $1
              AND tenant_id = $2
              AND status IN ('pendente', 'confirmado')
              AND start_time < $4
              AND end_time > $3
              AND ($5::uuid IS NULL OR id != $5)
            "#,
        )
        .bind(resource_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(start)
        .bind(end)
        .bind(exclude.map(|id| *id.as_uuid()))
        .fetch_all(&mut **tx)
        .await
    }

    async fn insert_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        input: CreateBooking,
    ) -> Result<Booking, sqlx::Error> {
        let id = BookingId::new();
        let pattern_json = input.recurring_pattern.as_ref().map(sqlx::types::Json);

        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pendente', $8, $9, $10, $11)
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(input.tenant_id.as_uuid())
        .bind(input.resource_id.as_uuid())
        .bind(input.user_id.as_uuid())
        .bind(input.client_id.as_uuid())
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.notes)
        .bind(input.recurring_enabled)
        .bind(pattern_json)
        .bind(input.recurrence_group_id.map(|id| *id.as_uuid()))
        .fetch_one(&mut **tx)
        .await
    }

    /// Re-run the conflict check for a time/resource change on an existing
    /// booking, excluding its own row, then apply the update. Caller has
    /// already run the policy gates against the new window.
    pub async fn update_time_and_resource(
        pool: &PgPool,
        tenant_id: TenantId,
        id: BookingId,
        resource_id: ResourceId,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Option<Booking>, BookingWriteError> {
        let mut tx = pool.begin().await?;
        Self::lock_resource(&mut tx, resource_id).await?;

        let conflicts =
            Self::conflicts_in_tx(&mut tx, tenant_id, resource_id, start_time, end_time, Some(id))
                .await?;
        if !conflicts.is_empty() {
            tx.rollback().await?;
            return Err(BookingWriteError::Conflict(conflicts));
        }

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET resource_id = $3, start_time = $4, end_time = $5, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(resource_id.as_uuid())
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(booking)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: BookingId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            FROM bookings
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        tenant_id: TenantId,
        resource_id: Option<ResourceId>,
        user_id: Option<UserId>,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            FROM bookings
            WHERE tenant_id = $1
              AND ($2::uuid IS NULL OR resource_id = $2)
              AND ($3::uuid IS NULL OR user_id = $3)
            ORDER BY start_time DESC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(resource_id.map(|id| *id.as_uuid()))
        .bind(user_id.map(|id| *id.as_uuid()))
        .fetch_all(pool)
        .await
    }

    /// Active (non-cancelled) bookings of a resource on a given UTC window,
    /// used by the availability projection's "filter out overlapping slots" step.
    pub async fn find_active_in_range(
        pool: &PgPool,
        tenant_id: TenantId,
        resource_id: ResourceId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            FROM bookings
            WHERE resource_id = $1
              AND tenant_id = $2
              AND status IN ('pendente', 'confirmado')
              AND start_time < $4
              AND end_time > $3
            ORDER BY start_time
            "#,
        )
        .bind(resource_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    pub async fn update_notes_and_status(
        pool: &PgPool,
        tenant_id: TenantId,
        id: BookingId,
        input: UpdateBooking,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET
                notes = COALESCE($3, notes),
                status = COALESCE($4, status),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&input.notes)
        .bind(input.status)
        .fetch_optional(pool)
        .await
    }

    pub async fn cancel(
        pool: &PgPool,
        tenant_id: TenantId,
        id: BookingId,
    ) -> Result<Option<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelado', updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: BookingId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes `resource.deleted`: cancel every active booking of that
    /// resource, unconditionally (cascade ignores I6), returning the rows
    /// that actually transitioned so the caller can publish one
    /// `booking.cancelled` per row.
    pub async fn cancel_all_by_resource(
        pool: &PgPool,
        resource_id: ResourceId,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelado', updated_at = NOW()
            WHERE resource_id = $1 AND status IN ('pendente', 'confirmado')
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(resource_id.as_uuid())
        .fetch_all(pool)
        .await
    }

    /// Consumes `user.deleted`: same, scoped by `user_id`.
    pub async fn cancel_all_by_user(pool: &PgPool, user_id: UserId) -> Result<Vec<Booking>, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = 'cancelado', updated_at = NOW()
            WHERE user_id = $1 AND status IN ('pendente', 'confirmado')
            RETURNING id, tenant_id, resource_id, user_id, client_id, start_time, end_time, status, notes, recurring_enabled, recurring_pattern, recurrence_group_id, created_at, updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(pool)
        .await
    }

    /// Consumes `tenant.deleted`: hard-delete, no cancellation events.
    pub async fn delete_all_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM bookings WHERE tenant_id = $1")
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

