mod engine;
mod slot;

pub use engine::{AvailabilityEngine, AvailabilityError, WeeklySchedule};
pub use slot::{AvailableSlot, BookingInterval};
