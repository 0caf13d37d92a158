mod app_error;
mod domain_error;

pub use app_error::{AppError, AppResult, ErrorKind};
pub use domain_error::DomainError;
