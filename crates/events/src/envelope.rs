use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::{EventKind, TenantId};

/// The envelope carried by every event on the fabric: `{event_type, payload,
/// metadata}`. `payload` stays an opaque JSON value here — each consumer
/// deserializes it into the shape it expects for that `event_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: EventKind,
    pub payload: serde_json::Value,
    pub metadata: EventMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub tenant_id: TenantId,
    pub emitted_at: DateTime<Utc>,
    pub event_version: u32,
}

pub const EVENT_VERSION: u32 = 1;

impl EventEnvelope {
    pub fn new(event_type: EventKind, tenant_id: TenantId, payload: serde_json::Value, emitted_at: DateTime<Utc>) -> Self {
        Self {
            event_type,
            payload,
            metadata: EventMetadata {
                tenant_id,
                emitted_at,
                event_version: EVENT_VERSION,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn round_trips_through_json() {
        let tenant_id = TenantId::from_uuid(Uuid::new_v4());
        let now = Utc::now();
        let envelope = EventEnvelope::new(
            EventKind::BookingCreated,
            tenant_id,
            serde_json::json!({"booking_id": "abc"}),
            now,
        );
        let encoded = serde_json::to_string(&envelope).unwrap();
        let decoded: EventEnvelope = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.event_type, envelope.event_type);
        assert_eq!(decoded.metadata.tenant_id, tenant_id);
    }
}
