use redis::aio::ConnectionManager;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// A thin TTL cache over Redis for `settings:tenant:<id>` and
/// `availability:resource:<id>:<date>`. Every method degrades gracefully:
/// a Redis error is logged and treated as a miss, never surfaced to the
/// caller, so cache unavailability cannot fail a request.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub fn settings_key(tenant_id: &str) -> String {
        format!("settings:tenant:{tenant_id}")
    }

    pub fn availability_key(resource_id: &str, date: &str) -> String {
        format!("availability:resource:{resource_id}:{date}")
    }

    pub fn idempotency_key(tenant_id: &str, key: &str) -> String {
        format!("idempotency:{tenant_id}:{key}")
    }

    /// `SET key value NX EX ttl`: stores `value` only if `key` is absent,
    /// returning whether this call is the one that claimed it. A Redis
    /// error is treated as "not claimed" — idempotency enforcement degrades
    /// to best-effort rather than failing the request, same as every other
    /// cache operation here.
    pub async fn set_nx<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let Ok(json) = serde_json::to_string(value) else {
            return false;
        };
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<Option<String>> = redis::cmd("SET")
            .arg(key)
            .arg(json)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await;
        match result {
            Ok(Some(_)) => true,
            Ok(None) => false,
            Err(err) => {
                tracing::warn!("cache SET NX {key} failed, idempotency not enforced: {err}");
                false
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let raw: redis::RedisResult<Option<String>> = redis::cmd("GET").arg(key).query_async(&mut conn).await;
        match raw {
            Ok(Some(json)) => serde_json::from_str(&json).ok(),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("cache GET {key} failed, falling through to source of truth: {err}");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Ok(json) = serde_json::to_string(value) else {
            return;
        };
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl.as_secs())
            .arg(json)
            .query_async(&mut conn)
            .await;
        if let Err(err) = result {
            tracing::warn!("cache SET {key} failed, write proceeds without caching: {err}");
        }
    }

    pub async fn invalidate(&self, key: &str) {
        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = redis::cmd("DEL").arg(key).query_async(&mut conn).await;
        if let Err(err) = result {
            tracing::warn!("cache DEL {key} failed: {err}");
        }
    }

    /// Invalidate every `availability:resource:<resource_id>:*` entry,
    /// since a single booking event can affect any date in that resource's
    /// projection window. Uses `SCAN` rather than `KEYS` to avoid blocking
    /// the Redis event loop on a large keyspace.
    pub async fn invalidate_availability_for_resource(&self, resource_id: &str) {
        let pattern = format!("availability:resource:{resource_id}:*");
        let mut conn = self.conn.clone();
        let mut cursor: u64 = 0;
        loop {
            let scan: redis::RedisResult<(u64, Vec<String>)> = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(200)
                .query_async(&mut conn)
                .await;
            let Ok((next_cursor, keys)) = scan else {
                tracing::warn!("cache SCAN for {pattern} failed");
                return;
            };
            for key in keys {
                self.invalidate(&key).await;
            }
            if next_cursor == 0 {
                break;
            }
            cursor = next_cursor;
        }
    }
}
