pub mod authz;
pub mod availability;
pub mod booking;

pub use authz::*;
pub use availability::*;
pub use booking::*;
