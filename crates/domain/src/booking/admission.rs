use crate::availability::WeeklySchedule;
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use shared::types::OrganizationSettings;
use shared::DomainError;

/// A candidate time window for a single booking occurrence, already
/// converted to UTC.
#[derive(Debug, Clone, Copy)]
pub struct CandidateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Normalize a possibly timezone-naive start/end pair into UTC, interpreting
/// naive input in the tenant's timezone, per the DST disambiguation rule:
/// on a gap or overlap, prefer the earlier offset rather than reject with
/// 422 (a documented choice, not a silent guess).
pub fn normalize(
    start: NaiveOrAware,
    end: NaiveOrAware,
    tz: &Tz,
) -> Result<CandidateWindow, DomainError> {
    let start_utc = start.into_utc(tz);
    let end_utc = end.into_utc(tz);
    if end_utc <= start_utc {
        return Err(DomainError::InvalidRecurrencePattern(
            "end must be after start".to_string(),
        ));
    }
    Ok(CandidateWindow {
        start: start_utc,
        end: end_utc,
    })
}

/// Either an already-zoned instant or a naive wall-clock literal to be
/// interpreted in the tenant's timezone.
#[derive(Debug, Clone, Copy)]
pub enum NaiveOrAware {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl NaiveOrAware {
    fn into_utc(self, tz: &Tz) -> DateTime<Utc> {
        match self {
            NaiveOrAware::Aware(dt) => dt,
            NaiveOrAware::Naive(naive) => {
                // Prefer the earlier offset on an ambiguous (overlap) local
                // time; on a nonexistent (gap) local time, chrono's
                // `earliest()` falls back to the offset just before the gap.
                tz.from_local_datetime(&naive)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
            }
        }
    }
}

/// Run the policy gates (I5, I3, I4a, I4b) against one candidate window, in
/// the order the admission algorithm specifies: the first failure
/// short-circuits with a specific error.
pub fn run_gates(
    window: CandidateWindow,
    now: DateTime<Utc>,
    settings: &OrganizationSettings,
    resource_schedule: &WeeklySchedule,
    tz: &Tz,
) -> Result<(), DomainError> {
    let start_local = window.start.with_timezone(tz);
    let end_local = window.end.with_timezone(tz);

    // (I5) advance booking window, compared in tenant time.
    let advance_limit = now.with_timezone(tz) + chrono::Duration::days(settings.advance_booking_days as i64);
    if start_local <= now.with_timezone(tz) {
        return Err(DomainError::AdvanceWindowExceeded);
    }
    if start_local > advance_limit {
        return Err(DomainError::AdvanceWindowExceeded);
    }

    // (I3) duration is a positive multiple of booking_interval.
    let duration_minutes = (window.end - window.start).num_minutes();
    if settings.booking_interval <= 0
        || duration_minutes <= 0
        || duration_minutes % settings.booking_interval as i64 != 0
    {
        return Err(DomainError::BadIntervalMultiple);
    }

    // (I4a) same local day, within tenant working hours.
    if start_local.date_naive() != end_local.date_naive() {
        return Err(DomainError::OutOfHours);
    }
    if start_local.time() < settings.working_hours_start || end_local.time() > settings.working_hours_end {
        return Err(DomainError::OutOfHours);
    }

    // (I4b) contained in the resource's availability schedule for that weekday.
    let weekday_idx = start_local.weekday().num_days_from_sunday() as u8;
    let ranges = resource_schedule.get(&weekday_idx).ok_or(DomainError::OutOfHours)?;
    let candidate = shared::types::TimeRange::new(start_local.time(), end_local.time())
        .map_err(|_| DomainError::OutOfHours)?;
    let contained = ranges.iter().any(|r| r.contains_range(&candidate));
    if !contained {
        return Err(DomainError::OutOfHours);
    }

    Ok(())
}

/// (I6) cancellation window: permitted only while `now + cancellation_hours
/// <= start_time`.
pub fn can_cancel(start_time: DateTime<Utc>, now: DateTime<Utc>, cancellation_hours: i32) -> bool {
    now + chrono::Duration::hours(cancellation_hours as i64) <= start_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::CustomLabels;
    use std::collections::HashMap;

    fn settings() -> OrganizationSettings {
        OrganizationSettings {
            business_type: "clinic".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            working_hours_start: chrono::NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            working_hours_end: chrono::NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            booking_interval: 30,
            advance_booking_days: 30,
            cancellation_hours: 24,
            custom_labels: CustomLabels::default(),
        }
    }

    fn schedule_open_monday() -> WeeklySchedule {
        let mut s = HashMap::new();
        s.insert(1u8, vec!["08:00-18:00".parse().unwrap()]);
        s
    }

    fn tz() -> Tz {
        "America/Sao_Paulo".parse().unwrap()
    }

    fn monday_window(start_hour: u32, end_hour: u32) -> CandidateWindow {
        let tz = tz();
        let naive = chrono::NaiveDate::from_ymd_opt(2025, 12, 8)
            .unwrap()
            .and_hms_opt(start_hour, 0, 0)
            .unwrap();
        let naive_end = chrono::NaiveDate::from_ymd_opt(2025, 12, 8)
            .unwrap()
            .and_hms_opt(end_hour, 0, 0)
            .unwrap();
        CandidateWindow {
            start: tz.from_local_datetime(&naive).unwrap().with_timezone(&Utc),
            end: tz.from_local_datetime(&naive_end).unwrap().with_timezone(&Utc),
        }
    }

    #[test]
    fn accepts_in_hours_aligned_booking() {
        let now = monday_window(8, 8).start - chrono::Duration::days(1);
        let window = monday_window(14, 15);
        let result = run_gates(window, now, &settings(), &schedule_open_monday(), &tz());
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_out_of_hours() {
        let now = monday_window(8, 8).start - chrono::Duration::days(1);
        let window = monday_window(22, 23);
        let result = run_gates(window, now, &settings(), &schedule_open_monday(), &tz());
        assert!(matches!(result, Err(DomainError::OutOfHours)));
    }

    #[test]
    fn rejects_bad_interval_multiple() {
        let now = monday_window(8, 8).start - chrono::Duration::days(1);
        let mut window = monday_window(14, 14);
        window.end = window.start + chrono::Duration::minutes(25);
        let result = run_gates(window, now, &settings(), &schedule_open_monday(), &tz());
        assert!(matches!(result, Err(DomainError::BadIntervalMultiple)));
    }

    #[test]
    fn rejects_beyond_advance_window() {
        let now = monday_window(8, 8).start - chrono::Duration::days(60);
        let window = monday_window(14, 15);
        let result = run_gates(window, now, &settings(), &schedule_open_monday(), &tz());
        assert!(matches!(result, Err(DomainError::AdvanceWindowExceeded)));
    }

    #[test]
    fn cancellation_window_respects_cutoff() {
        let start = monday_window(14, 15).start;
        assert!(can_cancel(start, start - chrono::Duration::hours(48), 24));
        assert!(!can_cancel(start, start - chrono::Duration::hours(2), 24));
    }
}
