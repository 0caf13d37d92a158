use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use shared::types::RecurrenceFrequency;

/// A finite, pure generator of occurrence dates. Never persisted as a
/// pattern-to-occurrences graph; a `recurrence_group_id` on each produced
/// booking row is enough to group them for group-level operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringPattern {
    pub frequency: RecurrenceFrequency,
    pub interval: u32,
    pub end_date: Option<NaiveDate>,
    /// Only meaningful (and required to be non-empty) for `Weekly`; keyed
    /// `0 = Sunday .. 6 = Saturday`, matching `Resource.availability_schedule`.
    pub days_of_week: Option<Vec<u8>>,
}

const MAX_OCCURRENCES: usize = 365;

impl RecurringPattern {
    /// Generate the occurrence set starting from (and including, where it
    /// matches) `start_date`, capped at `min(occurrences implied by end_date, 365)`.
    pub fn occurrences(&self, start_date: NaiveDate) -> Vec<NaiveDate> {
        match self.frequency {
            RecurrenceFrequency::Daily => self.daily(start_date),
            RecurrenceFrequency::Weekly => self.weekly(start_date),
            RecurrenceFrequency::Monthly => self.monthly(start_date),
        }
    }

    fn interval(&self) -> i64 {
        self.interval.max(1) as i64
    }

    fn within_bound(&self, date: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| date <= end)
    }

    fn daily(&self, start_date: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut cursor = start_date;
        while dates.len() < MAX_OCCURRENCES && self.within_bound(cursor) {
            dates.push(cursor);
            cursor += Duration::days(self.interval());
        }
        dates
    }

    fn weekly(&self, start_date: NaiveDate) -> Vec<NaiveDate> {
        let mut days: Vec<u8> = self
            .days_of_week
            .clone()
            .unwrap_or_else(|| vec![start_date.weekday().num_days_from_sunday() as u8]);
        days.sort_unstable();
        days.dedup();

        let week_start = start_date - Duration::days(start_date.weekday().num_days_from_sunday() as i64);

        let mut dates = Vec::new();
        let mut week = 0i64;
        'outer: loop {
            let this_week_start = week_start + Duration::weeks(week * self.interval());
            for &dow in &days {
                let date = this_week_start + Duration::days(dow as i64);
                if date < start_date {
                    continue;
                }
                if !self.within_bound(date) {
                    if self.end_date.is_some() {
                        break 'outer;
                    }
                    continue;
                }
                dates.push(date);
                if dates.len() >= MAX_OCCURRENCES {
                    break 'outer;
                }
            }
            week += 1;
            // Safety valve: if end_date is unset and somehow nothing is
            // emitted for a long stretch, the 365 cap above still bounds us,
            // but bound the week search itself too.
            if week > (MAX_OCCURRENCES as i64) * 2 {
                break;
            }
        }
        dates.sort_unstable();
        dates
    }

    fn monthly(&self, start_date: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut months_elapsed = 0i64;
        loop {
            let candidate = add_months(start_date, months_elapsed * self.interval());
            if !self.within_bound(candidate) {
                break;
            }
            dates.push(candidate);
            if dates.len() >= MAX_OCCURRENCES {
                break;
            }
            months_elapsed += 1;
        }
        dates
    }
}

/// Add `months` calendar months to `date`, clamping the day-of-month to the
/// last valid day if the target month is shorter (e.g. Jan 31 + 1mo -> Feb 28/29).
fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let total = date.year() as i64 * 12 + (date.month0() as i64) + months;
    let year = total.div_euclid(12) as i32;
    let month0 = total.rem_euclid(12) as u32;
    let last_day = last_day_of_month(year, month0 + 1);
    NaiveDate::from_ymd_opt(year, month0 + 1, date.day().min(last_day)).unwrap()
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn daily_every_interval_days_capped_by_end_date() {
        let p = RecurringPattern {
            frequency: RecurrenceFrequency::Daily,
            interval: 2,
            end_date: Some(date(2025, 12, 8)),
            days_of_week: None,
        };
        let occ = p.occurrences(date(2025, 12, 1));
        assert_eq!(
            occ,
            vec![
                date(2025, 12, 1),
                date(2025, 12, 3),
                date(2025, 12, 5),
                date(2025, 12, 7),
            ]
        );
    }

    #[test]
    fn weekly_emits_on_each_listed_weekday() {
        // 2025-12-08 is a Monday (weekday index 1).
        let p = RecurringPattern {
            frequency: RecurrenceFrequency::Weekly,
            interval: 1,
            end_date: Some(date(2025, 12, 14)),
            days_of_week: Some(vec![1, 3]), // Monday, Wednesday
        };
        let occ = p.occurrences(date(2025, 12, 8));
        assert_eq!(occ, vec![date(2025, 12, 8), date(2025, 12, 10)]);
    }

    #[test]
    fn weekly_four_mondays_no_end_date_capped_at_365_not_hit() {
        let p = RecurringPattern {
            frequency: RecurrenceFrequency::Weekly,
            interval: 1,
            end_date: Some(date(2025, 12, 29)),
            days_of_week: Some(vec![1]),
        };
        let occ = p.occurrences(date(2025, 12, 8));
        assert_eq!(
            occ,
            vec![
                date(2025, 12, 8),
                date(2025, 12, 15),
                date(2025, 12, 22),
                date(2025, 12, 29),
            ]
        );
    }

    #[test]
    fn monthly_same_day_of_month_clamped_for_short_months() {
        let p = RecurringPattern {
            frequency: RecurrenceFrequency::Monthly,
            interval: 1,
            end_date: Some(date(2026, 3, 1)),
            days_of_week: None,
        };
        let occ = p.occurrences(date(2026, 1, 31));
        // Feb 2026 has 28 days; clamp to Feb 28.
        assert_eq!(occ, vec![date(2026, 1, 31), date(2026, 2, 28)]);
    }

    #[test]
    fn no_end_date_is_capped_at_365_occurrences() {
        let p = RecurringPattern {
            frequency: RecurrenceFrequency::Daily,
            interval: 1,
            end_date: None,
            days_of_week: None,
        };
        let occ = p.occurrences(date(2025, 1, 1));
        assert_eq!(occ.len(), 365);
    }
}
