use axum::{extract::State, Json};
use db::{verify_password, UserRepository};
use serde::{Deserialize, Serialize};
use shared::types::TenantId;
use shared::DomainError;
use svc_common::auth::{create_token, JwtClaims};
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub tenant_id: TenantId,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Login is scoped to the tenant the caller names: the same email may exist
/// under a different tenant with a different password (I7).
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = UserRepository::find_by_email(&state.pool, input.tenant_id, &input.email)
        .await?
        .ok_or(ApiError::from(DomainError::InvalidCredentials))?;

    if !user.is_active || !verify_password(&input.password, &user.password_hash) {
        return Err(ApiError::from(DomainError::InvalidCredentials));
    }

    let claims = JwtClaims::new(user.id, user.tenant_id, user.user_type, user.permissions.0, state.jwt_expiry_hours);
    let access_token = create_token(&claims, &state.jwt_secret)
        .map_err(|_| ApiError::from(shared::AppError::Internal("failed to sign token".to_string())))?;

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
    }))
}
