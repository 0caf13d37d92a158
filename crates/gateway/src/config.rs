/// Gateway configuration: no database, no JWT secret — it forwards bytes
/// and lets each downstream service do its own authentication.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub tenant_service_url: String,
    pub user_service_url: String,
    pub resource_service_url: String,
    pub booking_service_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            port: env_or("PORT", 8080),
            tenant_service_url: required_env("TENANT_SERVICE_URL"),
            user_service_url: required_env("USER_SERVICE_URL"),
            resource_service_url: required_env("RESOURCE_SERVICE_URL"),
            booking_service_url: required_env("BOOKING_SERVICE_URL"),
        }
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
