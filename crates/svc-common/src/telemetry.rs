use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON-capable tracing, defaulting to `debug` for
/// `service_name` and `tower_http`, overridable via `RUST_LOG`.
pub fn init_tracing(service_name: &str) {
    let default_filter = format!("{service_name}=debug,tower_http=debug");
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and return a handle whose `render()`
/// backs the `/metrics` route.
pub fn init_metrics() -> metrics_exporter_prometheus::PrometheusHandle {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus metrics recorder")
}
