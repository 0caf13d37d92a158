pub mod errors;
pub mod types;

pub use errors::{AppError, AppResult, DomainError, ErrorKind};
pub use types::*;
