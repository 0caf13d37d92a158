use axum::{
    extract::{Path, Query, State},
    Json,
};
use db::models::{CreateUser, UpdateUser, User};
use db::UserRepository;
use domain::authz::{authorize, Action};
use serde::{Deserialize, Serialize};
use shared::types::{TenantId, UserId, UserType};
use shared::{AppError, DomainError};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub department: Option<String>,
    pub is_active: bool,
    pub permissions: domain::authz::Permissions,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            tenant_id: u.tenant_id,
            name: u.name,
            email: u.email,
            phone: u.phone,
            user_type: u.user_type,
            department: u.department,
            is_active: u.is_active,
            permissions: u.permissions.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub tenant_id: TenantId,
}

/// Public signup. The caller's `tenant_id` must name a tenant that actually
/// exists; rather than open a direct dependency on the tenant store, this
/// asks tenant-service over HTTP (§5's synchronous-call pattern).
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> ApiResult<(axum::http::StatusCode, Json<UserResponse>)> {
    if state
        .tenant_client
        .get_json::<serde_json::Value>(&format!("/tenants/{}", input.tenant_id), "")
        .await
        .is_err()
    {
        return Err(ApiError::from(DomainError::TenantNotFound(input.tenant_id.to_string())));
    }

    if UserRepository::find_by_email(&state.pool, input.tenant_id, &input.email)
        .await?
        .is_some()
    {
        return Err(ApiError::from(DomainError::EmailAlreadyExists(input.email.clone())));
    }

    let user = UserRepository::create(&state.pool, input).await?;
    Ok((axum::http::StatusCode::CREATED, Json(user.into())))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    require_manage_users(&auth, query.tenant_id)?;

    let users = UserRepository::list_by_tenant(&state.pool, query.tenant_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserRepository::find_by_id(&state.pool, auth.tenant_id, id)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::UserNotFound(id.to_string())))?;

    require_self_or_manage_users(&auth, id)?;

    Ok(Json(user.into()))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserResponse>> {
    let user = UserRepository::find_by_id(&state.pool, auth.tenant_id, auth.claims_sub)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::UserNotFound(auth.claims_sub.to_string())))?;
    Ok(Json(user.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(mut input): Json<UpdateUser>,
) -> ApiResult<Json<UserResponse>> {
    require_self_or_manage_users(&auth, id)?;

    // Only an admin/manager may change `is_active` or grant permissions;
    // a self-update silently drops those fields instead of failing.
    if authorize(&auth.domain_claims(), Action::ManageUsers, auth.tenant_id, None).is_permit() {
        // admin retains full input
    } else {
        input.is_active = None;
        input.permissions = None;
    }

    let user = UserRepository::update(&state.pool, auth.tenant_id, id, input)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::UserNotFound(id.to_string())))?;
    Ok(Json(user.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UserId>,
) -> ApiResult<axum::http::StatusCode> {
    require_manage_users(&auth, auth.tenant_id)?;

    let deleted = UserRepository::delete(&state.pool, auth.tenant_id, id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::UserNotFound(id.to_string())));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn require_manage_users(auth: &AuthUser, tenant: TenantId) -> Result<(), ApiError> {
    let decision = authorize(&auth.domain_claims(), Action::ManageUsers, tenant, None);
    if decision.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}

fn require_self_or_manage_users(auth: &AuthUser, owner: UserId) -> Result<(), ApiError> {
    let self_decision = authorize(&auth.domain_claims(), Action::Self_ { owner }, auth.tenant_id, None);
    if self_decision.is_permit() {
        return Ok(());
    }
    require_manage_users(auth, auth.tenant_id)
}
