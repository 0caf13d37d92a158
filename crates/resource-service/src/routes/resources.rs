use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use db::models::{CreateResource, Resource, UpdateResource};
use db::ResourceRepository;
use events::EventEnvelope;
use serde::Deserialize;
use shared::types::{CategoryId, ResourceId, TenantId};
use shared::{DomainError, EventKind};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::routes::categories::require_manage_resources;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListResourcesQuery {
    pub tenant_id: TenantId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

pub async fn create_resource(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateResource>,
) -> ApiResult<(axum::http::StatusCode, Json<Resource>)> {
    require_manage_resources(&auth, input.tenant_id)?;
    let resource = ResourceRepository::create(&state.pool, input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(resource)))
}

pub async fn list_resources(
    State(state): State<AppState>,
    Query(query): Query<ListResourcesQuery>,
) -> ApiResult<Json<Vec<Resource>>> {
    let resources = ResourceRepository::list_by_tenant(&state.pool, query.tenant_id, query.category_id).await?;
    Ok(Json(resources))
}

pub async fn get_resource(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ResourceId>,
) -> ApiResult<Json<Resource>> {
    let resource = ResourceRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::ResourceNotFound(id.to_string())))?;
    Ok(Json(resource))
}

pub async fn update_resource(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ResourceId>,
    Json(input): Json<UpdateResource>,
) -> ApiResult<Json<Resource>> {
    require_manage_resources(&auth, auth.tenant_id)?;
    let resource = ResourceRepository::update(&state.pool, auth.tenant_id, id, input)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::ResourceNotFound(id.to_string())))?;

    state.cache.invalidate_availability_for_resource(&id.to_string()).await;
    Ok(Json(resource))
}

/// DELETE publishes `resource.deleted{resource_id}` so booking-service can
/// cancel every booking still pointing at the removed resource.
pub async fn delete_resource(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<ResourceId>,
) -> ApiResult<axum::http::StatusCode> {
    require_manage_resources(&auth, auth.tenant_id)?;

    let deleted = ResourceRepository::delete(&state.pool, auth.tenant_id, id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::ResourceNotFound(id.to_string())));
    }

    let envelope = EventEnvelope::new(
        EventKind::ResourceDeleted,
        auth.tenant_id,
        serde_json::json!({ "resource_id": id }),
        Utc::now(),
    );
    if let Err(err) = state.publisher.publish(EventKind::ResourceDeleted.stream(), &envelope).await {
        tracing::error!("failed to publish resource.deleted for {id}: {err}");
    }

    state.cache.invalidate_availability_for_resource(&id.to_string()).await;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
