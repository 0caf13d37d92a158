use std::time::Duration;

/// Configuration shared by every service: database, auth, cache, and the
/// HTTP port to bind. Each service's `main.rs` loads this first, then reads
/// any service-specific variables (peer URLs, etc.) itself.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub redis_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub port: u16,
    pub cache_ttl_settings: Duration,
    pub cache_ttl_availability: Duration,
}

impl CoreConfig {
    /// Load from the process environment, applying `.env` first via
    /// `dotenvy` (a missing `.env` file is not an error — only missing
    /// required variables are).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: required_env("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            jwt_secret: required_env("JWT_SECRET"),
            jwt_expiry_hours: env_or("JWT_EXPIRY_HOURS", 24),
            port: env_or("PORT", 8080),
            cache_ttl_settings: Duration::from_secs(env_or("CACHE_TTL_SETTINGS", 300)),
            cache_ttl_availability: Duration::from_secs(env_or("CACHE_TTL_AVAILABILITY", 60)),
        }
    }

    pub fn peer_url(name: &str) -> String {
        required_env(name)
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
