use chrono_tz::Tz;
use domain::availability::WeeklySchedule;
use shared::types::{OrganizationSettings, ResourceId, TenantId};
use shared::DomainError;
use svc_common::error::ApiError;
use svc_common::http_client::InternalCallError;

use crate::state::AppState;

/// Everything the policy gates need about the booking's tenant and resource,
/// resolved from sibling services (cache-first, synchronous HTTP on miss).
pub struct AdmissionContext {
    pub settings: OrganizationSettings,
    pub tz: Tz,
    pub resource_schedule: WeeklySchedule,
}

/// Tenant settings are resolved cache-first, then a synchronous call to
/// tenant-service. Unlike resource lookup, a miss here never falls back to
/// a permissive default: serving made-up working hours could silently admit
/// an out-of-hours booking, so an unreachable tenant-service with no cached
/// settings hard-refuses with `dependency_unavailable`.
pub async fn resolve_settings(state: &AppState, tenant_id: TenantId) -> Result<OrganizationSettings, ApiError> {
    let key = events::RedisCache::settings_key(&tenant_id.to_string());
    if let Some(cached) = state.cache.get::<OrganizationSettings>(&key).await {
        return Ok(cached);
    }

    match state
        .tenant_client
        .get_json::<OrganizationSettings>(&format!("/tenants/{tenant_id}/settings"), "")
        .await
    {
        Ok(settings) => {
            state.cache.set(&key, &settings, state.cache_ttl_settings).await;
            Ok(settings)
        }
        Err(err) => {
            tracing::warn!("tenant-service unreachable resolving settings for {tenant_id}, no cached settings: {err}");
            Err(ApiError::from(shared::AppError::DependencyUnavailable(format!(
                "tenant-service: {err}"
            ))))
        }
    }
}

/// The resource's availability schedule must come from resource-service
/// directly: unlike settings, a missing resource is a hard failure (the
/// caller named a resource that doesn't exist or isn't this tenant's), not
/// something to default around.
pub async fn resolve_resource_schedule(
    state: &AppState,
    tenant_id: TenantId,
    resource_id: ResourceId,
) -> Result<WeeklySchedule, ApiError> {
    let path = format!("/internal/resources/{resource_id}?tenant_id={tenant_id}");
    let resource = state
        .resource_client
        .get_json::<db::models::Resource>(&path, "")
        .await
        .map_err(|err| match err {
            InternalCallError::Status(_, 404) => ApiError::from(DomainError::ResourceNotFound(resource_id.to_string())),
            other => ApiError::from(shared::AppError::DependencyUnavailable(format!("resource-service: {other}"))),
        })?;
    Ok(resource.weekly_schedule())
}

pub async fn resolve(state: &AppState, tenant_id: TenantId, resource_id: ResourceId) -> Result<AdmissionContext, ApiError> {
    let settings = resolve_settings(state, tenant_id).await?;
    let tz: Tz = settings
        .timezone
        .parse()
        .map_err(|_| ApiError::from(shared::AppError::Validation(format!("unknown timezone: {}", settings.timezone))))?;
    let resource_schedule = resolve_resource_schedule(state, tenant_id, resource_id).await?;
    Ok(AdmissionContext {
        settings,
        tz,
        resource_schedule,
    })
}
