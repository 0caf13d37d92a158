use events::{RedisCache, StreamConsumer, StreamMessage};
use shared::types::EventKind;
use sqlx::PgPool;
use std::time::Duration;

/// Consumes `deletion-events`: owns the `tenant.deleted` cascade over
/// categories and resources.
pub async fn run_deletion_events(pool: PgPool, redis_url: String) {
    run_stream(&redis_url, EventKind::TenantDeleted.stream(), "resource-service", move |message| {
        let pool = pool.clone();
        async move { handle_deletion(&pool, message).await }
    })
    .await;
}

async fn handle_deletion(pool: &PgPool, message: StreamMessage) -> bool {
    if message.envelope.event_type != EventKind::TenantDeleted {
        return true;
    }

    let Some(tenant_id) = message
        .envelope
        .payload
        .get("tenant_id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
    else {
        return true;
    };

    match db::ResourceRepository::delete_all_by_tenant(pool, tenant_id).await {
        Ok(count) => tracing::info!("cascaded tenant.deleted: removed {count} resource(s) for tenant {tenant_id}"),
        Err(err) => {
            tracing::error!("failed to cascade tenant.deleted resources for {tenant_id}: {err}");
            return false;
        }
    }

    true
}

/// Consumes `booking-events` purely for cache invalidation: any booking
/// mutation on a resource invalidates every cached availability projection
/// for that resource, since the cheapest correct key to drop is the whole
/// resource rather than computing which date changed.
pub async fn run_booking_events(cache: RedisCache, redis_url: String) {
    run_stream(&redis_url, "booking-events", "resource-service", move |message| {
        let cache = cache.clone();
        async move { handle_booking_event(&cache, message).await }
    })
    .await;
}

async fn handle_booking_event(cache: &RedisCache, message: StreamMessage) -> bool {
    if let Some(resource_id) = message.envelope.payload.get("resource_id").and_then(|v| v.as_str()) {
        cache.invalidate_availability_for_resource(resource_id).await;
    }
    true
}

async fn run_stream<F, Fut>(redis_url: &str, stream: &str, group: &str, handler: F)
where
    F: Fn(StreamMessage) -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let consumer = match StreamConsumer::new(redis_url, stream, group, hostname()).await {
        Ok(c) => c,
        Err(err) => {
            tracing::error!("failed to start {stream} consumer: {err}");
            return;
        }
    };

    if let Ok(messages) = consumer.reclaim_stale(Duration::from_secs(60)).await {
        for message in messages {
            let id = message.id.clone();
            if handler(message).await {
                let _ = consumer.ack(&id).await;
            }
        }
    }

    loop {
        match consumer.read_new(50, Duration::from_secs(5)).await {
            Ok(messages) => {
                for message in messages {
                    let id = message.id.clone();
                    if handler(message).await {
                        if let Err(err) = consumer.ack(&id).await {
                            tracing::warn!("failed to ack {stream} message {id}: {err}");
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!("{stream} read failed: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "resource-service".to_string())
}
