use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::types::BookingId;

/// A bookable slot produced by the availability projection, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AvailableSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        self.start < other_end && other_start < self.end
    }
}

/// A committed booking interval, fetched from the booking store, that the
/// projection must subtract from generated slots.
#[derive(Debug, Clone)]
pub struct BookingInterval {
    pub id: BookingId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingInterval {
    pub fn new(id: BookingId, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { id, start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_available_slot_duration() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 11, 0, 0).unwrap();
        let slot = AvailableSlot::new(start, end);
        assert_eq!(slot.duration_minutes(), 60);
    }

    #[test]
    fn test_booking_interval_overlap() {
        let start = Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let booking = BookingInterval::new(BookingId::from_uuid(Uuid::new_v4()), start, end);
        let slot = AvailableSlot::new(start, end);
        assert!(slot.overlaps(booking.start, booking.end));
    }
}
