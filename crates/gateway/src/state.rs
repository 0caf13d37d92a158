use metrics_exporter_prometheus::PrometheusHandle;
use reqwest::Client;

use crate::config::GatewayConfig;

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub prefix: &'static str,
    pub upstream: fn(&GatewayConfig) -> &str,
}

pub const ROUTES: &[Route] = &[
    Route { prefix: "/tenants", upstream: |c| &c.tenant_service_url },
    Route { prefix: "/users", upstream: |c| &c.user_service_url },
    Route { prefix: "/categories", upstream: |c| &c.resource_service_url },
    Route { prefix: "/resources", upstream: |c| &c.resource_service_url },
    Route { prefix: "/bookings", upstream: |c| &c.booking_service_url },
];

#[derive(Clone)]
pub struct AppState {
    pub client: Client,
    pub config: GatewayConfig,
    pub metrics_handle: PrometheusHandle,
}

impl axum::extract::FromRef<AppState> for PrometheusHandle {
    fn from_ref(state: &AppState) -> Self {
        state.metrics_handle.clone()
    }
}
