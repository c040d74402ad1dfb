use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,wxs=debug";

/// Install the global subscriber: JSON lines on stdout, filtered by
/// RUST_LOG (default "info,wxs=debug").
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init(service_name: &str) {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %service_name, "Observability initialized");
    }
}
