use chrono::Utc;
use db::BookingRepository;
use events::{EventEnvelope, StreamConsumer, StreamMessage, StreamPublisher};
use shared::types::{ResourceId, TenantId, UserId};
use shared::EventKind;
use sqlx::PgPool;
use std::time::Duration;

/// Consumes `deletion-events`: cancels every active booking a deleted
/// resource or user touches (publishing one `booking.cancelled` per row so
/// downstream webhooks still see the cancellation), and hard-deletes every
/// booking of a deleted tenant with no events published.
pub async fn run(pool: PgPool, publisher: StreamPublisher, redis_url: String) {
    let consumer = match StreamConsumer::new(redis_url.as_str(), "deletion-events", "booking-service", hostname()).await
    {
        Ok(c) => c,
        Err(err) => {
            tracing::error!("failed to start deletion-events consumer: {err}");
            return;
        }
    };

    if let Ok(messages) = consumer.reclaim_stale(Duration::from_secs(60)).await {
        for message in messages {
            let id = message.id.clone();
            handle(&pool, &publisher, message).await;
            let _ = consumer.ack(&id).await;
        }
    }

    loop {
        match consumer.read_new(50, Duration::from_secs(5)).await {
            Ok(messages) => {
                for message in messages {
                    let id = message.id.clone();
                    handle(&pool, &publisher, message).await;
                    if let Err(err) = consumer.ack(&id).await {
                        tracing::warn!("failed to ack deletion-events message {id}: {err}");
                    }
                }
            }
            Err(err) => {
                tracing::warn!("deletion-events read failed: {err}");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

async fn handle(pool: &PgPool, publisher: &StreamPublisher, message: StreamMessage) {
    match message.envelope.event_type {
        EventKind::ResourceDeleted => {
            let Some(resource_id) = field::<ResourceId>(&message, "resource_id") else { return };
            match BookingRepository::cancel_all_by_resource(pool, resource_id).await {
                Ok(cancelled) => publish_cancellations(publisher, cancelled, "resource_deleted").await,
                Err(err) => tracing::error!("failed to cascade resource.deleted for {resource_id}: {err}"),
            }
        }
        EventKind::UserDeleted => {
            let Some(user_id) = field::<UserId>(&message, "user_id") else { return };
            match BookingRepository::cancel_all_by_user(pool, user_id).await {
                Ok(cancelled) => publish_cancellations(publisher, cancelled, "user_deleted").await,
                Err(err) => tracing::error!("failed to cascade user.deleted for {user_id}: {err}"),
            }
        }
        EventKind::TenantDeleted => {
            let Some(tenant_id) = field::<TenantId>(&message, "tenant_id") else { return };
            match BookingRepository::delete_all_by_tenant(pool, tenant_id).await {
                Ok(count) => tracing::info!("cascaded tenant.deleted: removed {count} booking(s) for tenant {tenant_id}"),
                Err(err) => tracing::error!("failed to cascade tenant.deleted bookings for {tenant_id}: {err}"),
            }
        }
        _ => {}
    }
}

async fn publish_cancellations(publisher: &StreamPublisher, cancelled: Vec<db::models::Booking>, reason: &str) {
    for booking in cancelled {
        let envelope = EventEnvelope::new(
            EventKind::BookingCancelled,
            booking.tenant_id,
            serde_json::json!({
                "booking_id": booking.id,
                "resource_id": booking.resource_id,
                "user_id": booking.user_id,
                "reason": reason,
            }),
            Utc::now(),
        );
        if let Err(err) = publisher.publish(EventKind::BookingCancelled.stream(), &envelope).await {
            tracing::error!("failed to publish cascaded booking.cancelled for {}: {err}", booking.id);
        }
    }
}

fn field<T: std::str::FromStr>(message: &StreamMessage, key: &str) -> Option<T> {
    message.envelope.payload.get(key).and_then(|v| v.as_str()).and_then(|s| s.parse().ok())
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "booking-service".to_string())
}
