use shared::types::{OrganizationSettings, TenantId};
use sqlx::PgPool;

use crate::models::{CreateTenant, Tenant, UpdateTenant};

pub struct TenantRepository;

impl TenantRepository {
    pub async fn create(pool: &PgPool, input: CreateTenant) -> Result<Tenant, sqlx::Error> {
        let id = TenantId::new();
        let settings = input.settings.unwrap_or_else(OrganizationSettings::defaults);
        let plan = input.plan.unwrap_or_else(|| "basico".to_string());

        sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (id, name, domain, logo_url, theme_primary_color, plan, is_active, settings)
            VALUES ($1, $2, $3, $4, $5, $6, true, $7)
            RETURNING id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&input.name)
        .bind(&input.domain)
        .bind(&input.logo_url)
        .bind(&input.theme_primary_color)
        .bind(&plan)
        .bind(sqlx::types::Json(&settings))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: TenantId) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            FROM tenants
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_domain(pool: &PgPool, domain: &str) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            FROM tenants
            WHERE domain = $1
            "#,
        )
        .bind(domain)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            FROM tenants
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: TenantId,
        input: UpdateTenant,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET
                name = COALESCE($2, name),
                domain = COALESCE($3, domain),
                logo_url = COALESCE($4, logo_url),
                theme_primary_color = COALESCE($5, theme_primary_color),
                plan = COALESCE($6, plan),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(&input.name)
        .bind(&input.domain)
        .bind(&input.logo_url)
        .bind(&input.theme_primary_color)
        .bind(&input.plan)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await
    }

    /// Updating settings must invalidate the `settings:tenant:<id>` cache
    /// entry; the caller (tenant-service handler) is responsible for that
    /// after this commits.
    pub async fn update_settings(
        pool: &PgPool,
        id: TenantId,
        settings: &OrganizationSettings,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        sqlx::query_as::<_, Tenant>(
            r#"
            UPDATE tenants
            SET settings = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, domain, logo_url, theme_primary_color, plan, is_active, settings, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(sqlx::types::Json(settings))
        .fetch_optional(pool)
        .await
    }

    /// Delete is atomic in its own store; the caller publishes
    /// `tenant.deleted{tenant_id}` after this commits.
    pub async fn delete(pool: &PgPool, id: TenantId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
