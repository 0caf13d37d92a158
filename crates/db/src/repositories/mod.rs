mod booking_repo;
mod category_repo;
mod resource_repo;
mod tenant_repo;
mod user_repo;
mod webhook_repo;

pub use booking_repo::{BookingRepository, BookingWriteError};
pub use category_repo::CategoryRepository;
pub use resource_repo::ResourceRepository;
pub use tenant_repo::TenantRepository;
pub use user_repo::{hash_password, verify_password, UserRepository};
pub use webhook_repo::WebhookRepository;
