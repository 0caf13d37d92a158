use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{OrganizationSettings, TenantId};
use sqlx::FromRow;

/// Tenant database model. Owns its users, categories, resources, bookings,
/// and webhooks transitively; no entity survives its tenant.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: String,
    pub is_active: bool,
    pub settings: sqlx::types::Json<OrganizationSettings>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTenant {
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: Option<String>,
    pub settings: Option<OrganizationSettings>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateTenant {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: Option<String>,
    pub is_active: Option<bool>,
}
