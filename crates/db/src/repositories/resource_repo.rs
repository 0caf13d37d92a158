use shared::types::{CategoryId, ResourceId, ResourceStatus, TenantId};
use sqlx::PgPool;

use crate::models::{CreateResource, Resource, UpdateResource};

pub struct ResourceRepository;

impl ResourceRepository {
    pub async fn create(pool: &PgPool, input: CreateResource) -> Result<Resource, sqlx::Error> {
        let id = ResourceId::new();

        sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url)
            VALUES ($1, $2, $3, $4, $5, 'disponivel', $6, $7, $8, $9, $10)
            RETURNING id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(input.tenant_id.as_uuid())
        .bind(input.category_id.as_uuid())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.capacity)
        .bind(&input.location)
        .bind(sqlx::types::Json(&input.attributes))
        .bind(sqlx::types::Json(&input.availability_schedule))
        .bind(&input.image_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: ResourceId,
    ) -> Result<Option<Resource>, sqlx::Error> {
        sqlx::query_as::<_, Resource>(
            r#"
            SELECT id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
            FROM resources
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    /// Needed by the booking service's synchronous admission call, which
    /// only has `resource_id` and its own `tenant_id` claim to pass along.
    pub async fn find_by_id_for_tenant(
        pool: &PgPool,
        id: ResourceId,
        tenant_id: TenantId,
    ) -> Result<Option<Resource>, sqlx::Error> {
        Self::find_by_id(pool, tenant_id, id).await
    }

    pub async fn list_by_tenant(
        pool: &PgPool,
        tenant_id: TenantId,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Resource>, sqlx::Error> {
        match category_id {
            Some(cat) => {
                sqlx::query_as::<_, Resource>(
                    r#"
                    SELECT id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
                    FROM resources
                    WHERE tenant_id = $1 AND category_id = $2
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id.as_uuid())
                .bind(cat.as_uuid())
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Resource>(
                    r#"
                    SELECT id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
                    FROM resources
                    WHERE tenant_id = $1
                    ORDER BY name
                    "#,
                )
                .bind(tenant_id.as_uuid())
                .fetch_all(pool)
                .await
            }
        }
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: ResourceId,
        input: UpdateResource,
    ) -> Result<Option<Resource>, sqlx::Error> {
        let attributes_json = input.attributes.map(sqlx::types::Json);
        let schedule_json = input.availability_schedule.map(sqlx::types::Json);

        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                status = COALESCE($5, status),
                capacity = COALESCE($6, capacity),
                location = COALESCE($7, location),
                attributes = COALESCE($8, attributes),
                availability_schedule = COALESCE($9, availability_schedule),
                image_url = COALESCE($10, image_url),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status)
        .bind(input.capacity)
        .bind(&input.location)
        .bind(attributes_json)
        .bind(schedule_json)
        .bind(&input.image_url)
        .fetch_optional(pool)
        .await
    }

    pub async fn set_status(
        pool: &PgPool,
        tenant_id: TenantId,
        id: ResourceId,
        status: ResourceStatus,
    ) -> Result<Option<Resource>, sqlx::Error> {
        sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, category_id, name, description, status, capacity, location, attributes, availability_schedule, image_url, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: ResourceId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes `tenant.deleted`.
    pub async fn delete_all_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM resources WHERE tenant_id = $1")
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
