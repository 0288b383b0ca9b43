use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
///
/// Logs go to stderr so command output on stdout stays machine-readable.
/// When `RUST_LOG` is set it replaces the configured level entirely.
pub fn init_telemetry(observability: &ObservabilityConfig) -> Result<()> {
    let json_layer = observability.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!observability.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .with(log_filter(observability))
        .try_init()?;

    tracing::info!("TuTranquilo telemetry initialized with structured logging");
    Ok(())
}

fn log_filter(observability: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level: tracing::Level = observability
            .log_level
            .parse()
            .unwrap_or(tracing::Level::INFO);
        EnvFilter::default().add_directive(level.into())
    })
}

/// Generate a correlation ID for linking the steps of one booking
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common booking flow attributes
pub fn create_flow_span(
    operation: &str,
    correlation_id: Option<&str>,
    route: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "booking_flow",
        operation = operation,
        correlation.id = correlation_id,
        service.route = route,
    )
}

pub fn shutdown_telemetry() {
    tracing::info!("TuTranquilo telemetry shutdown complete");
}
