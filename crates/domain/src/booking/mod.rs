mod admission;
mod recurrence;

pub use admission::{can_cancel, normalize, run_gates, CandidateWindow, NaiveOrAware};
pub use recurrence::RecurringPattern;
