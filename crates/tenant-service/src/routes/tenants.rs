use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use db::models::{CreateTenant, UpdateTenant};
use db::TenantRepository;
use domain::authz::{authorize, Action};
use events::{EventEnvelope, RedisCache};
use serde::{Deserialize, Serialize};
use shared::types::{OrganizationSettings, TenantId};
use shared::{AppError, DomainError, EventKind};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTenantsQuery {
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TenantResponse {
    pub id: TenantId,
    pub name: String,
    pub domain: String,
    pub logo_url: Option<String>,
    pub theme_primary_color: Option<String>,
    pub plan: String,
    pub is_active: bool,
    pub settings: OrganizationSettings,
}

impl From<db::models::Tenant> for TenantResponse {
    fn from(t: db::models::Tenant) -> Self {
        Self {
            id: t.id,
            name: t.name,
            domain: t.domain,
            logo_url: t.logo_url,
            theme_primary_color: t.theme_primary_color,
            plan: t.plan,
            is_active: t.is_active,
            settings: t.settings.0,
        }
    }
}

pub async fn create_tenant(
    State(state): State<AppState>,
    Json(input): Json<CreateTenant>,
) -> ApiResult<(axum::http::StatusCode, Json<TenantResponse>)> {
    if TenantRepository::find_by_domain(&state.pool, &input.domain)
        .await?
        .is_some()
    {
        return Err(ApiError::from(DomainError::TenantDomainExists(input.domain.clone())));
    }

    let tenant = TenantRepository::create(&state.pool, input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(tenant.into())))
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Query(query): Query<ListTenantsQuery>,
) -> ApiResult<Json<Vec<TenantResponse>>> {
    let tenants = TenantRepository::list(&state.pool, query.limit.unwrap_or(100), query.offset.unwrap_or(0)).await?;
    Ok(Json(tenants.into_iter().map(TenantResponse::from).collect()))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<TenantId>,
) -> ApiResult<Json<TenantResponse>> {
    let tenant = TenantRepository::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::TenantNotFound(id.to_string())))?;
    Ok(Json(tenant.into()))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TenantId>,
    Json(input): Json<UpdateTenant>,
) -> ApiResult<Json<TenantResponse>> {
    require_admin_of(&auth, id)?;

    let tenant = TenantRepository::update(&state.pool, id, input)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::TenantNotFound(id.to_string())))?;
    Ok(Json(tenant.into()))
}

/// DELETE triggers the cascade: the tenant row is removed atomically in its
/// own store, then `tenant.deleted{tenant_id}` is published so user,
/// resource and booking services can hard-delete what they own.
pub async fn delete_tenant(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TenantId>,
) -> ApiResult<axum::http::StatusCode> {
    require_admin_of(&auth, id)?;

    let deleted = TenantRepository::delete(&state.pool, id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::TenantNotFound(id.to_string())));
    }

    let envelope = EventEnvelope::new(EventKind::TenantDeleted, id, serde_json::json!({ "tenant_id": id }), Utc::now());
    if let Err(err) = state.publisher.publish(EventKind::TenantDeleted.stream(), &envelope).await {
        tracing::error!("failed to publish tenant.deleted for {id}: {err}");
    }

    state.cache.invalidate(&RedisCache::settings_key(&id.to_string())).await;

    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(id): Path<TenantId>,
) -> ApiResult<Json<OrganizationSettings>> {
    let tenant = TenantRepository::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::TenantNotFound(id.to_string())))?;
    Ok(Json(tenant.settings.0))
}

/// Updating settings invalidates `settings:tenant:<id>` after the write
/// commits, per §4.1 and §5's cache-ordering rule.
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TenantId>,
    Json(settings): Json<OrganizationSettings>,
) -> ApiResult<Json<OrganizationSettings>> {
    require_admin_of(&auth, id)?;

    let tenant = TenantRepository::update_settings(&state.pool, id, &settings)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::TenantNotFound(id.to_string())))?;

    state.cache.invalidate(&RedisCache::settings_key(&id.to_string())).await;

    Ok(Json(tenant.settings.0))
}

fn require_admin_of(auth: &AuthUser, tenant: TenantId) -> Result<(), ApiError> {
    let decision = authorize(&auth.domain_claims(), Action::AdminOfTenant, tenant, None);
    if decision.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}
