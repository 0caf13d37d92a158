use chrono::{DateTime, Utc};
use domain::authz::Permissions;
use serde::{Deserialize, Serialize};
use shared::types::{TenantId, UserId, UserType};
use sqlx::FromRow;

/// User database model. `email` is unique within `tenant_id`, not globally
/// (I7) — the same address may exist across tenants.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub department: Option<String>,
    pub is_active: bool,
    pub permissions: sqlx::types::Json<Permissions>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub user_type: UserType,
    pub department: Option<String>,
    #[serde(default)]
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
    pub permissions: Option<Permissions>,
}
