use db::WebhookRepository;
use events::{StreamConsumer, StreamMessage};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use shared::types::EventKind;
use sqlx::PgPool;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);
const STREAMS: &[&str] = &["booking-events", "deletion-events"];

/// Delivers events to every tenant-registered webhook subscribed to that
/// event kind. Runs one `StreamConsumer` per logical stream, since each
/// stream is a distinct Redis key with its own consumer group. Delivery
/// failures are logged and the stream message is still acked — a dropped
/// webhook delivery never blocks or re-delivers the underlying domain event,
/// matching spec.md §5's "webhook delivery never blocks the publishing
/// transaction".
pub async fn run(pool: PgPool, redis_url: String) {
    let client = Client::builder()
        .timeout(WEBHOOK_TIMEOUT)
        .build()
        .expect("reqwest client configuration is static and always valid");

    let mut handles = Vec::new();
    for stream in STREAMS {
        let pool = pool.clone();
        let redis_url = redis_url.clone();
        let client = client.clone();
        handles.push(tokio::spawn(run_stream(pool, redis_url, client, stream)));
    }
    for handle in handles {
        let _ = handle.await;
    }
}

async fn run_stream(pool: PgPool, redis_url: String, client: Client, stream: &'static str) {
    let consumer = match StreamConsumer::new(redis_url.as_str(), stream, "webhook-dispatcher", hostname()).await {
        Ok(c) => c,
        Err(err) => {
            tracing::error!("failed to start {stream} consumer for webhook dispatch: {err}");
            return;
        }
    };

    if let Ok(messages) = consumer.reclaim_stale(Duration::from_secs(60)).await {
        for message in messages {
            deliver(&pool, &client, &message).await;
            let _ = consumer.ack(&message.id).await;
        }
    }

    loop {
        match consumer.read_new(50, Duration::from_secs(5)).await {
            Ok(messages) => {
                for message in messages {
                    deliver(&pool, &client, &message).await;
                    if let Err(err) = consumer.ack(&message.id).await {
                        tracing::warn!("failed to ack {stream} message {}: {err}", message.id);
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

async fn deliver(pool: &PgPool, client: &Client, message: &StreamMessage) {
    let tenant_id = message.envelope.metadata.tenant_id;
    let kind = message.envelope.event_type;

    let subscribed = match WebhookRepository::list_subscribed(pool, tenant_id, kind).await {
        Ok(webhooks) => webhooks,
        Err(err) => {
            tracing::error!("failed to look up webhooks for tenant {tenant_id}: {err}");
            return;
        }
    };
    if subscribed.is_empty() {
        return;
    }

    let body = serde_json::json!({
        "event": kind.as_str(),
        "data": message.envelope.payload,
    })
    .to_string();

    for webhook in subscribed {
        let mut request = client.post(&webhook.url).header("Content-Type", "application/json");
        if let Some(secret) = &webhook.secret {
            request = request.header("X-Webhook-Signature", format!("sha256={}", sign(secret, &body)));
        }

        if let Err(err) = request.body(body.clone()).send().await {
            tracing::warn!("webhook delivery to {} failed for {kind}: {err}", webhook.url);
        }
    }
}

fn sign(secret: &str, body: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts a key of any length");
    mac.update(body.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn hostname() -> String {
    std::env::var("HOSTNAME").unwrap_or_else(|_| "tenant-service".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_deterministic_and_key_dependent() {
        let body = r#"{"event":"booking.created","data":{}}"#;
        let a = sign("whsec_one", body);
        let b = sign("whsec_one", body);
        let c = sign("whsec_two", body);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64, "hex-encoded sha256 digest is 64 characters");
    }

    #[test]
    fn signature_changes_with_body() {
        let a = sign("whsec_one", "{}");
        let b = sign("whsec_one", r#"{"event":"booking.cancelled"}"#);
        assert_ne!(a, b);
    }
}
