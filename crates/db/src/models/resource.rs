use chrono::{DateTime, Utc};
use domain::availability::WeeklySchedule;
use serde::{Deserialize, Serialize};
use shared::types::{CategoryId, ResourceId, ResourceStatus, TenantId, TimeRange};
use sqlx::FromRow;
use std::collections::HashMap;

/// A bookable unit (room, person, equipment) with a weekly availability
/// schedule. JSON object keys must be strings, so the schedule is stored
/// `"0".."6"` (`0 = Sunday`) and converted to `WeeklySchedule` for the
/// availability engine; a day missing from the map means closed that day.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub tenant_id: TenantId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub status: ResourceStatus,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: sqlx::types::Json<serde_json::Value>,
    pub availability_schedule: sqlx::types::Json<HashMap<String, Vec<TimeRange>>>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    /// Convert the stored string-keyed schedule into the `u8`-keyed form the
    /// availability engine and admission gates expect.
    pub fn weekly_schedule(&self) -> WeeklySchedule {
        self.availability_schedule
            .0
            .iter()
            .filter_map(|(k, v)| k.parse::<u8>().ok().map(|day| (day, v.clone())))
            .collect()
    }
}

/// Convert a `WeeklySchedule` (`u8`-keyed) into the JSON-storable
/// string-keyed form.
pub fn schedule_to_json(schedule: &WeeklySchedule) -> HashMap<String, Vec<TimeRange>> {
    schedule
        .iter()
        .map(|(day, ranges)| (day.to_string(), ranges.clone()))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateResource {
    pub tenant_id: TenantId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    #[serde(default = "default_attributes")]
    pub attributes: serde_json::Value,
    pub availability_schedule: HashMap<String, Vec<TimeRange>>,
    pub image_url: Option<String>,
}

fn default_attributes() -> serde_json::Value {
    serde_json::json!({})
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ResourceStatus>,
    pub capacity: Option<i32>,
    pub location: Option<String>,
    pub attributes: Option<serde_json::Value>,
    pub availability_schedule: Option<HashMap<String, Vec<TimeRange>>>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_schedule_round_trips_through_string_keys() {
        let mut schedule: WeeklySchedule = HashMap::new();
        schedule.insert(1, vec!["08:00-18:00".parse().unwrap()]);
        schedule.insert(3, vec!["09:00-12:00".parse().unwrap()]);

        let json = schedule_to_json(&schedule);
        let resource_schedule: HashMap<String, Vec<TimeRange>> = json;

        let restored: WeeklySchedule = resource_schedule
            .iter()
            .filter_map(|(k, v)| k.parse::<u8>().ok().map(|day| (day, v.clone())))
            .collect();

        assert_eq!(restored.get(&1).unwrap().len(), 1);
        assert_eq!(restored.get(&3).unwrap().len(), 1);
        assert!(restored.get(&0).is_none());
    }
}
