pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod http_client;
pub mod telemetry;

pub use auth::{AuthUser, JwtClaims, JwtSecretProvider};
pub use config::CoreConfig;
pub use error::{ApiError, ApiResult};
pub use http_client::{InternalCallError, InternalServiceClient};
