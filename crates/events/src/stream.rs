use crate::envelope::EventEnvelope;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Publishes envelopes onto a Redis Stream. Publication is best-effort from
/// the caller's perspective: a failure is logged by the caller and does not
/// roll back the already-committed write it describes.
#[derive(Clone)]
pub struct StreamPublisher {
    conn: ConnectionManager,
}

impl StreamPublisher {
    pub async fn connect(redis_url: &str) -> Result<Self, StreamError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    /// `XADD <stream> * event <json>`. The stream ID chosen by Redis is
    /// returned; callers generally don't need it, since handlers key
    /// idempotency off the envelope's own fields.
    pub async fn publish(&self, stream: &str, envelope: &EventEnvelope) -> Result<String, StreamError> {
        let payload = serde_json::to_string(envelope)?;
        let mut conn = self.conn.clone();
        let id: String = conn.xadd(stream, "*", &[("event", payload)]).await?;
        Ok(id)
    }
}

/// One message read off a stream, still pending acknowledgement.
pub struct StreamMessage {
    pub id: String,
    pub envelope: EventEnvelope,
}

/// Reads from a Redis Stream via a named consumer group, per the at-least-
/// once delivery model: messages claimed-but-unacked by a prior incarnation
/// of this consumer name are reprocessed on the next read, since `XREADGROUP`
/// with `>` only returns genuinely new entries and a restart resumes under
/// the same consumer name.
#[derive(Clone)]
pub struct StreamConsumer {
    conn: ConnectionManager,
    stream: String,
    group: String,
    consumer: String,
}

impl StreamConsumer {
    /// Ensures the consumer group exists (creating the stream with `MKSTREAM`
    /// if needed), starting from the beginning of history on first creation.
    pub async fn new(
        redis_url: &str,
        stream: impl Into<String>,
        group: impl Into<String>,
        consumer: impl Into<String>,
    ) -> Result<Self, StreamError> {
        let client = redis::Client::open(redis_url)?;
        let mut conn = ConnectionManager::new(client).await?;
        let stream = stream.into();
        let group = group.into();

        let created: redis::RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&stream)
            .arg(&group)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(&mut conn)
            .await;
        if let Err(err) = created {
            if !err.to_string().contains("BUSYGROUP") {
                return Err(err.into());
            }
        }

        Ok(Self {
            conn,
            stream,
            group,
            consumer: consumer.into(),
        })
    }

    /// Reclaim entries idle for longer than `min_idle` that were claimed by
    /// a previous incarnation of this consumer but never acked, so a
    /// restarted consumer resumes work it dropped.
    pub async fn reclaim_stale(&self, min_idle: Duration) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.conn.clone();
        let reply: redis::Value = redis::cmd("XAUTOCLAIM")
            .arg(&self.stream)
            .arg(&self.group)
            .arg(&self.consumer)
            .arg(min_idle.as_millis() as u64)
            .arg("0")
            .arg("COUNT")
            .arg(100)
            .query_async(&mut conn)
            .await?;
        parse_xautoclaim(reply)
    }

    /// Block up to `block_for` waiting for new entries for this consumer.
    pub async fn read_new(&self, count: usize, block_for: Duration) -> Result<Vec<StreamMessage>, StreamError> {
        let mut conn = self.conn.clone();
        let reply: redis::Value = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.group)
            .arg(&self.consumer)
            .arg("COUNT")
            .arg(count)
            .arg("BLOCK")
            .arg(block_for.as_millis() as u64)
            .arg("STREAMS")
            .arg(&self.stream)
            .arg(">")
            .query_async(&mut conn)
            .await?;
        parse_xreadgroup(reply, &self.stream)
    }

    pub async fn ack(&self, id: &str) -> Result<(), StreamError> {
        let mut conn = self.conn.clone();
        let _: i64 = conn.xack(&self.stream, &self.group, &[id]).await?;
        Ok(())
    }
}

fn parse_xreadgroup(value: redis::Value, stream: &str) -> Result<Vec<StreamMessage>, StreamError> {
    let Some((_name, entries)) = redis::from_redis_value::<Vec<(String, Vec<(String, Vec<(String, String)>)>)>>(&value)
        .ok()
        .and_then(|v| v.into_iter().find(|(name, _)| name == stream))
    else {
        return Ok(Vec::new());
    };
    decode_entries(entries)
}

fn parse_xautoclaim(value: redis::Value) -> Result<Vec<StreamMessage>, StreamError> {
    // XAUTOCLAIM replies [cursor, entries, deleted]; we only need `entries`.
    let (_cursor, entries, _deleted): (String, Vec<(String, Vec<(String, String)>)>, Vec<String>) =
        redis::from_redis_value(&value)?;
    decode_entries(entries)
}

fn decode_entries(entries: Vec<(String, Vec<(String, String)>)>) -> Result<Vec<StreamMessage>, StreamError> {
    let mut out = Vec::with_capacity(entries.len());
    for (id, fields) in entries {
        if let Some((_, payload)) = fields.iter().find(|(k, _)| k == "event") {
            let envelope: EventEnvelope = serde_json::from_str(payload)?;
            out.push(StreamMessage { id, envelope });
        }
    }
    Ok(out)
}
