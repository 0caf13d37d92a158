use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use shared::types::{TenantId, UserId};
use sqlx::PgPool;

use crate::models::{CreateUser, UpdateUser, User};

pub struct UserRepository;

impl UserRepository {
    pub async fn create(pool: &PgPool, input: CreateUser) -> Result<User, sqlx::Error> {
        let id = UserId::new();
        let password_hash = hash_password(&input.password);

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, true, $9)
            RETURNING id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(input.tenant_id.as_uuid())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.phone)
        .bind(input.user_type)
        .bind(&input.department)
        .bind(sqlx::types::Json(input.permissions))
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        tenant_id: TenantId,
        id: UserId,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            FROM users
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_id_any_tenant(
        pool: &PgPool,
        id: UserId,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await
    }

    /// Email is unique only within a tenant (I7).
    pub async fn find_by_email(
        pool: &PgPool,
        tenant_id: TenantId,
        email: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            FROM users
            WHERE tenant_id = $1 AND email = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    /// Login resolves the tenant from the caller's request (the tenant
    /// service is consulted for the domain, or the caller supplies
    /// `tenant_id` directly); this scans across tenants by email, returning
    /// at most one match per tenant by construction.
    pub async fn find_by_email_any_tenant(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_all(pool)
        .await
    }

    pub async fn list_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            FROM users
            WHERE tenant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        tenant_id: TenantId,
        id: UserId,
        input: UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let permissions_json = input.permissions.map(sqlx::types::Json);

        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                name = COALESCE($3, name),
                phone = COALESCE($4, phone),
                department = COALESCE($5, department),
                is_active = COALESCE($6, is_active),
                permissions = COALESCE($7, permissions),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING id, tenant_id, name, email, password_hash, phone, user_type, department, is_active, permissions, created_at, updated_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.department)
        .bind(input.is_active)
        .bind(permissions_json)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, tenant_id: TenantId, id: UserId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Consumes `tenant.deleted`: hard-delete every user of that tenant.
    pub async fn delete_all_by_tenant(pool: &PgPool, tenant_id: TenantId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE tenant_id = $1")
            .bind(tenant_id.as_uuid())
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

pub fn hash_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("argon2 hashing parameters are static and always valid")
        .to_string()
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
