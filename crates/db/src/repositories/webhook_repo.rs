use shared::types::{EventKind, TenantId, WebhookId};
use sqlx::PgPool;

use crate::models::{CreateWebhook, UpdateWebhook, Webhook};

pub struct WebhookRepository;

impl WebhookRepository {
    pub async fn create(pool: &PgPool, input: CreateWebhook) -> Result<Webhook, sqlx::Error> {
        let id = WebhookId::new();

        sqlx::query_as::<_, Webhook>(
            r#"
            INSERT INTO webhooks (id, tenant_id, url, events, secret, is_active)
            VALUES ($1, $2, $3, $4, $5, true)
            RETURNING id, tenant_id, url, events, secret, is_active, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(input.tenant_id.as_uuid())
        .bind(&input.url)
        .bind(sqlx::types::Json(&input.events))
        .bind(&input.secret)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: WebhookId,
    ) -> Result<Option<Webhook>, sqlx::Error> {
        sqlx::query_as::<_, Webhook>(
            r#"
            SELECT id, tenant_id, url, events, secret, is_active, created_at, updated_at
            FROM webhooks
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<Vec<Webhook>, sqlx::Error> {
        sqlx::query_as::<_, Webhook>(
            r#"
            SELECT id, tenant_id, url, events, secret, is_active, created_at, updated_at
            FROM webhooks
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(pool)
        .await
    }

    /// Active webhooks for a tenant subscribed to `kind`, used by the
    /// outbound webhook dispatcher after an event is consumed off the fabric.
    pub async fn list_subscribed(
        pool: &PgPool,
        tenant_id: TenantId,
        kind: EventKind,
    ) -> Result<Vec<Webhook>, sqlx::Error> {
        let all = Self::list_by_tenant(pool, tenant_id).await?;
        Ok(all
            .into_iter()
            .filter(|w| w.is_active && w.events.0.contains(&kind))
            .collect())
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: WebhookId,
        input: UpdateWebhook,
    ) -> Result<Option<Webhook>, sqlx::Error> {
        let events_json = input.events.map(sqlx::types::Json);

        sqlx::query_as::<_, Webhook>(
            r#"
            UPDATE webhooks
            SET
                url = COALESCE($3, url),
                events = COALESCE($4, events),
                secret = COALESCE($5, secret),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, url, events, secret, is_active, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&input.url)
        .bind(events_json)
        .bind(&input.secret)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: WebhookId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhooks WHERE id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes `tenant.deleted`.
    pub async fn delete_all_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM webhooks WHERE tenant_id = $1")
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
