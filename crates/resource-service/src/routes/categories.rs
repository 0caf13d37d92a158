use axum::{
    extract::{Path, Query, State},
    Json,
};
use db::models::{Category, CreateCategory, UpdateCategory};
use db::CategoryRepository;
use domain::authz::{authorize, Action};
use serde::Deserialize;
use shared::types::{CategoryId, TenantId};
use shared::{AppError, DomainError};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub tenant_id: TenantId,
}

pub async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateCategory>,
) -> ApiResult<(axum::http::StatusCode, Json<Category>)> {
    require_manage_resources(&auth, input.tenant_id)?;
    let category = CategoryRepository::create(&state.pool, input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<ListCategoriesQuery>,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = CategoryRepository::list_by_tenant(&state.pool, query.tenant_id).await?;
    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CategoryId>,
) -> ApiResult<Json<Category>> {
    let category = CategoryRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::CategoryNotFound(id.to_string())))?;
    Ok(Json(category))
}

pub async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CategoryId>,
    Json(input): Json<UpdateCategory>,
) -> ApiResult<Json<Category>> {
    require_manage_resources(&auth, auth.tenant_id)?;
    let category = CategoryRepository::update(&state.pool, auth.tenant_id, id, input)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::CategoryNotFound(id.to_string())))?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<CategoryId>,
) -> ApiResult<axum::http::StatusCode> {
    require_manage_resources(&auth, auth.tenant_id)?;
    let deleted = CategoryRepository::delete(&state.pool, auth.tenant_id, id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::CategoryNotFound(id.to_string())));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub(crate) fn require_manage_resources(auth: &AuthUser, tenant: TenantId) -> Result<(), ApiError> {
    let decision = authorize(&auth.domain_claims(), Action::ManageResources, tenant, Some(auth.permissions));
    if decision.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}
