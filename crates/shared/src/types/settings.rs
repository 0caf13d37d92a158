use serde::{Deserialize, Serialize};

/// Per-tenant scheduling policy, embedded as JSON on the tenant row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSettings {
    pub business_type: String,
    /// IANA timezone name, e.g. "America/Sao_Paulo".
    pub timezone: String,
    pub working_hours_start: chrono::NaiveTime,
    pub working_hours_end: chrono::NaiveTime,
    /// Minutes; slot width and the unit every booking duration must divide.
    pub booking_interval: i32,
    pub advance_booking_days: i32,
    pub cancellation_hours: i32,
    pub custom_labels: CustomLabels,
}

impl OrganizationSettings {
    /// Documented fallback policy used when the tenant service is
    /// unreachable and the settings cache also misses. Deliberately
    /// restrictive: a narrow window rather than a permissive one, since
    /// guessing wrong in the permissive direction could admit an
    /// out-of-hours booking.
    pub fn defaults() -> Self {
        Self {
            business_type: "generic".to_string(),
            timezone: "UTC".to_string(),
            working_hours_start: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            working_hours_end: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            booking_interval: 30,
            advance_booking_days: 0,
            cancellation_hours: 24,
            custom_labels: CustomLabels::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomLabels {
    pub resource_singular: String,
    pub resource_plural: String,
    pub booking_label: String,
    pub user_label: String,
}

impl Default for CustomLabels {
    fn default() -> Self {
        Self {
            resource_singular: "resource".to_string(),
            resource_plural: "resources".to_string(),
            booking_label: "booking".to_string(),
            user_label: "user".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let s = OrganizationSettings::defaults();
        assert!(s.working_hours_end > s.working_hours_start);
        assert!(s.booking_interval > 0);
    }
}
