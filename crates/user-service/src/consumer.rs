use events::StreamConsumer;
use shared::types::{EventKind, TenantId};
use sqlx::PgPool;
use std::time::Duration;

/// Consumes `deletion-events`: user-service owns the `tenant.deleted`
/// cascade, hard-deleting every user row of that tenant. Every other event
/// on this stream belongs to a sibling service and is acked without action.
pub async fn run(pool: PgPool, redis_url: String) {
    let consumer = match StreamConsumer::new(
        redis_url.as_str(),
        EventKind::TenantDeleted.stream(),
        "user-service",
        hostname(),
    )
    .await
    {
        Ok(c) => c,
        Err(err) => {
            tracing::error!("failed to start deletion-events consumer: {err}");
            return;
        }
    };

    match consumer.reclaim_stale(Duration::from_secs(60)).await {
        Ok(messages) => {
            for message in messages {
                handle(&pool, &consumer, message).await;
            }
        }
        Err(err) => tracing::warn!("failed to reclaim stale deletion-events: {err}"),
    }

    loop {
        match consumer.read_new(50, Duration::from_secs(5)).await {
            Ok(messages) => {
                for message in messages {
                    handle(&pool, &consumer, message).await;
                }
            }
            Err(err) => {
                tracing::warn!("deletion-events read failed: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

async fn handle(pool: &PgPool, consumer: &StreamConsumer, message: events::StreamMessage) {
    if message.envelope.event_type == EventKind::TenantDeleted {
        let tenant_id: Option<TenantId> = message
            .envelope
            .payload
            .get("tenant_id")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok());

        if let Some(tenant_id) = tenant_id {
            match db::UserRepository::delete_all_by_tenant(pool, tenant_id).await {
                Ok(count) => tracing::info!("cascaded tenant.deleted: removed {count} user(s) for tenant {tenant_id}"),
                Err(err) => {
                    tracing::error!("failed to cascade tenant.deleted for {tenant_id}: {err}");
                    return;
                }
            }
        }
    }

    if let Err(err) = consumer.ack(&message.id).await {
        tracing::warn!("failed to ack deletion-events message {}: {err}", message.id);
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "user-service".to_string())
}
