use super::slot::{AvailableSlot, BookingInterval};
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use shared::types::{OrganizationSettings, TimeRange};
use std::collections::HashMap;
use thiserror::Error;

/// A resource's weekly availability, keyed `0 = Sunday .. 6 = Saturday`. A
/// day absent from the map means the resource is closed that day.
pub type WeeklySchedule = HashMap<u8, Vec<TimeRange>>;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
    #[error("local time {0} is ambiguous or does not exist in timezone {1}")]
    AmbiguousLocalTime(NaiveTime, String),
}

/// Pure projection of a resource's bookable slots for one calendar date,
/// per the availability projection algorithm: intersect the resource's
/// weekday schedule with tenant working hours, slice into
/// `booking_interval`-wide slots aligned to the intersection's start,
/// convert to UTC, then drop any slot overlapping an existing booking.
pub struct AvailabilityEngine;

impl AvailabilityEngine {
    pub fn project(
        schedule: &WeeklySchedule,
        settings: &OrganizationSettings,
        date: NaiveDate,
        existing_bookings: &[BookingInterval],
    ) -> Result<Vec<AvailableSlot>, AvailabilityError> {
        let tz: Tz = settings
            .timezone
            .parse()
            .map_err(|_| AvailabilityError::UnknownTimezone(settings.timezone.clone()))?;

        let weekday_idx = date.weekday().num_days_from_sunday() as u8;
        let Some(day_ranges) = schedule.get(&weekday_idx) else {
            return Ok(Vec::new());
        };

        let working_hours = match TimeRange::new(
            settings.working_hours_start,
            settings.working_hours_end,
        ) {
            Ok(r) => r,
            Err(_) => return Ok(Vec::new()),
        };

        let mut slots = Vec::new();
        for local_range in day_ranges {
            let Some(intersection) = local_range.intersect(&working_hours) else {
                continue;
            };
            slots.extend(Self::slice_interval(
                &intersection,
                settings.booking_interval,
                date,
                &tz,
            )?);
        }

        slots.retain(|slot| {
            !existing_bookings
                .iter()
                .any(|b| slot.overlaps(b.start, b.end))
        });

        Ok(slots)
    }

    /// Emit contiguous `interval_minutes`-wide slots across `range`, aligned
    /// to `range.start`, dropping a tail shorter than a full interval.
    fn slice_interval(
        range: &TimeRange,
        interval_minutes: i32,
        date: NaiveDate,
        tz: &Tz,
    ) -> Result<Vec<AvailableSlot>, AvailabilityError> {
        let step = chrono::Duration::minutes(interval_minutes as i64);
        let mut slots = Vec::new();
        let mut cursor = range.start;

        while cursor + step <= range.end {
            let slot_end = cursor + step;
            let start_utc = Self::to_utc(date, cursor, tz)?;
            let end_utc = Self::to_utc(date, slot_end, tz)?;
            slots.push(AvailableSlot::new(start_utc, end_utc));
            cursor = slot_end;
        }

        Ok(slots)
    }

    fn to_utc(
        date: NaiveDate,
        time: NaiveTime,
        tz: &Tz,
    ) -> Result<chrono::DateTime<chrono::Utc>, AvailabilityError> {
        let naive = date.and_time(time);
        tz.from_local_datetime(&naive)
            .single()
            .ok_or_else(|| AvailabilityError::AmbiguousLocalTime(time, tz.to_string()))
            .map(|dt| dt.with_timezone(&chrono::Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::CustomLabels;
    use uuid::Uuid;

    fn settings() -> OrganizationSettings {
        OrganizationSettings {
            business_type: "clinic".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            working_hours_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            booking_interval: 30,
            advance_booking_days: 30,
            cancellation_hours: 24,
            custom_labels: CustomLabels::default(),
        }
    }

    fn monday() -> NaiveDate {
        // 2025-12-08 is a Monday.
        NaiveDate::from_ymd_opt(2025, 12, 8).unwrap()
    }

    #[test]
    fn projects_slots_within_intersection() {
        let mut schedule: WeeklySchedule = HashMap::new();
        schedule.insert(1, vec!["08:00-18:00".parse().unwrap()]); // Monday = 1

        let slots = AvailabilityEngine::project(&schedule, &settings(), monday(), &[]).unwrap();
        assert_eq!(slots.len(), 20); // 10 hours / 30 min
    }

    #[test]
    fn closed_day_yields_no_slots() {
        let schedule: WeeklySchedule = HashMap::new();
        let slots = AvailabilityEngine::project(&schedule, &settings(), monday(), &[]).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn narrower_resource_hours_clip_the_projection() {
        let mut schedule: WeeklySchedule = HashMap::new();
        schedule.insert(1, vec!["09:00-12:00".parse().unwrap()]);

        let slots = AvailabilityEngine::project(&schedule, &settings(), monday(), &[]).unwrap();
        assert_eq!(slots.len(), 6); // 3 hours / 30 min
    }

    #[test]
    fn drops_short_tail_fragment() {
        let mut schedule: WeeklySchedule = HashMap::new();
        schedule.insert(1, vec!["08:00-09:15".parse().unwrap()]);

        let slots = AvailabilityEngine::project(&schedule, &settings(), monday(), &[]).unwrap();
        assert_eq!(slots.len(), 2); // 08:00-08:30, 08:30-09:00; 09:00-09:15 dropped
    }

    #[test]
    fn existing_booking_removes_overlapping_slot() {
        let mut schedule: WeeklySchedule = HashMap::new();
        schedule.insert(1, vec!["08:00-10:00".parse().unwrap()]);

        let tz: Tz = "America/Sao_Paulo".parse().unwrap();
        let naive = monday().and_time(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        let booked_start = tz
            .from_local_datetime(&naive)
            .single()
            .unwrap()
            .with_timezone(&chrono::Utc);
        let booked_end = booked_start + chrono::Duration::minutes(30);

        let existing = vec![BookingInterval::new(
            shared::types::BookingId::from_uuid(Uuid::new_v4()),
            booked_start,
            booked_end,
        )];

        let slots = AvailabilityEngine::project(&schedule, &settings(), monday(), &existing).unwrap();
        assert_eq!(slots.len(), 3); // 4 total slots minus the booked one
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let mut s = settings();
        s.timezone = "Not/A_Zone".to_string();
        let schedule: WeeklySchedule = HashMap::new();
        assert!(AvailabilityEngine::project(&schedule, &s, monday(), &[]).is_err());
    }
}
