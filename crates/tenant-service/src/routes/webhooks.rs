use axum::{
    extract::{Path, State},
    Json,
};
use db::models::{CreateWebhook, UpdateWebhook};
use db::WebhookRepository;
use domain::authz::{authorize, Action};
use serde::Deserialize;
use shared::types::{TenantId, WebhookId};
use shared::{AppError, DomainError};
use svc_common::auth::AuthUser;
use svc_common::error::{ApiError, ApiResult};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWebhookRequest {
    pub url: String,
    pub events: Vec<shared::EventKind>,
    pub secret: Option<String>,
}

pub async fn create_webhook(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<TenantId>,
    Json(req): Json<CreateWebhookRequest>,
) -> ApiResult<(axum::http::StatusCode, Json<db::models::Webhook>)> {
    require_admin_of(&auth, tenant_id)?;

    if !db::models::is_allowed_webhook_url(&req.url) {
        return Err(ApiError::from(AppError::Validation(
            "webhook url must be https:// or http://localhost".to_string(),
        )));
    }

    let webhook = WebhookRepository::create(
        &state.pool,
        CreateWebhook {
            tenant_id,
            url: req.url,
            events: req.events,
            secret: req.secret,
        },
    )
    .await?;

    Ok((axum::http::StatusCode::CREATED, Json(webhook)))
}

pub async fn list_webhooks(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(tenant_id): Path<TenantId>,
) -> ApiResult<Json<Vec<db::models::Webhook>>> {
    require_admin_of(&auth, tenant_id)?;
    let webhooks = WebhookRepository::list_by_tenant(&state.pool, tenant_id).await?;
    Ok(Json(webhooks))
}

pub async fn update_webhook(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, webhook_id)): Path<(TenantId, WebhookId)>,
    Json(input): Json<UpdateWebhook>,
) -> ApiResult<Json<db::models::Webhook>> {
    require_admin_of(&auth, tenant_id)?;

    let webhook = WebhookRepository::update(&state.pool, tenant_id, webhook_id, input)
        .await?
        .ok_or_else(|| ApiError::from(DomainError::WebhookNotFound(webhook_id.to_string())))?;
    Ok(Json(webhook))
}

pub async fn delete_webhook(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((tenant_id, webhook_id)): Path<(TenantId, WebhookId)>,
) -> ApiResult<axum::http::StatusCode> {
    require_admin_of(&auth, tenant_id)?;

    let deleted = WebhookRepository::delete(&state.pool, tenant_id, webhook_id).await?;
    if !deleted {
        return Err(ApiError::from(DomainError::WebhookNotFound(webhook_id.to_string())));
    }
    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn require_admin_of(auth: &AuthUser, tenant: TenantId) -> Result<(), ApiError> {
    let decision = authorize(&auth.domain_claims(), Action::AdminOfTenant, tenant, None);
    if decision.is_permit() {
        Ok(())
    } else {
        Err(ApiError::from(AppError::Forbidden))
    }
}
