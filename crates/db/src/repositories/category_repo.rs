use shared::types::{CategoryId, TenantId};
use sqlx::PgPool;

use crate::models::{Category, CreateCategory, UpdateCategory};

pub struct CategoryRepository;

impl CategoryRepository {
    pub async fn create(pool: &PgPool, input: CreateCategory) -> Result<Category, sqlx::Error> {
        let id = CategoryId::new();

        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, tenant_id, name, description, category_type, icon, color, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true)
            RETURNING id, tenant_id, name, description, category_type, icon, color, is_active, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(input.tenant_id.as_uuid())
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category_type)
        .bind(&input.icon)
        .bind(&input.color)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: CategoryId,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, tenant_id, name, description, category_type, icon, color, is_active, created_at, updated_at
            FROM categories
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn list_by_tenant(
        pool: &PgPool,
        tenant_id: TenantId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, tenant_id, name, description, category_type, icon, color, is_active, created_at, updated_at
            FROM categories
            WHERE tenant_id = $1
            ORDER BY name
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: CategoryId,
        input: UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                icon = COALESCE($5, icon),
                color = COALESCE($6, color),
                is_active = COALESCE($7, is_active),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, name, description, category_type, icon, color, is_active, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.icon)
        .bind(&input.color)
        .bind(input.is_active)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: CategoryId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
