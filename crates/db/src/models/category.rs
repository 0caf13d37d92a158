use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{CategoryId, CategoryType, TenantId};
use sqlx::FromRow;

/// A grouping of bookable resources within a tenant: physical spaces,
/// people, or software seats, per `CategoryType`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub category_type: CategoryType,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub tenant_id: TenantId,
    pub name: String,
    pub description: Option<String>,
    pub category_type: CategoryType,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}
