use axum::{
    extract::{Path, Query, State},
    Json,
};
use db::models::Resource;
use db::ResourceRepository;
use serde::Deserialize;
use shared::types::{ResourceId, TenantId};
use shared::DomainError;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InternalResourceQuery {
    pub tenant_id: TenantId,
}

/// Unauthenticated, service-to-service lookup used by booking-service's
/// admission glue: the caller already holds a verified `tenant_id` from its
/// own request, so this trades the bearer token for that claim directly
/// instead of requiring a forwarded `Authorization` header.
pub async fn get_resource_internal(
    State(state): State<AppState>,
    Path(id): Path<ResourceId>,
    Query(query): Query<InternalResourceQuery>,
) -> ApiResult<Json<Resource>> {
    let resource = ResourceRepository::find_by_id(&state.pool, query.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::ResourceNotFound(id.to_string())))?;
    Ok(Json(resource))
}
