use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{EventKind, TenantId, WebhookId};
use sqlx::FromRow;

/// A tenant-registered webhook endpoint. `url` must be `https://` or
/// `http://localhost`; every other scheme is rejected at creation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Webhook {
    pub id: WebhookId,
    pub tenant_id: TenantId,
    pub url: String,
    pub events: sqlx::types::Json<Vec<EventKind>>,
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWebhook {
    pub tenant_id: TenantId,
    pub url: String,
    pub events: Vec<EventKind>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateWebhook {
    pub url: Option<String>,
    pub events: Option<Vec<EventKind>>,
    pub secret: Option<String>,
    pub is_active: Option<bool>,
}

/// Validate the webhook URL scheme per the data-model rule.
pub fn is_allowed_webhook_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_localhost() {
        assert!(is_allowed_webhook_url("https://example.com/hook"));
        assert!(is_allowed_webhook_url("http://localhost:3000/hook"));
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(!is_allowed_webhook_url("http://example.com/hook"));
        assert!(!is_allowed_webhook_url("ftp://example.com/hook"));
    }
}
