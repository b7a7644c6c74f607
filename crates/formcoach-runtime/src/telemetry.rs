//! Tracing pipeline initialisation for FormCoach.
//!
//! Call [`init_tracing`] once at process startup.  The frame driver logs
//! every evaluated frame at `debug`, every cue at `info` and every detector
//! failure at `warn`.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `FORMCOACH_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | OTLP collector base URL (e.g. `http://localhost:4318`). When set, spans are also exported over OTLP/HTTP. |
//!
//! # Example
//!
//! ```rust,no_run
//! // Hold the guard for the entire lifetime of the process.
//! let _guard = formcoach_runtime::telemetry::init_tracing("formcoach");
//! ```

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{Resource, trace::SdkTracerProvider};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log line format.
pub const LOG_FORMAT_ENV: &str = "FORMCOACH_LOG_FORMAT";

/// Install the global `tracing` subscriber.
///
/// The returned [`TracerProviderGuard`] must be held until exit; dropping it
/// flushes pending spans.
pub fn init_tracing(service_name: &str) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = json_requested(std::env::var(LOG_FORMAT_ENV).ok().as_deref());

    let provider = build_provider(service_name);
    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("formcoach")));

    // `Option<Layer>` is itself a layer, so exactly one formatter is active.
    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(use_json.then(|| fmt::layer().json()))
        .with((!use_json).then(|| fmt::layer().compact()))
        .init();

    TracerProviderGuard(provider)
}

/// RAII guard that shuts down the OTel [`SdkTracerProvider`] on drop.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[formcoach] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

fn json_requested(format: Option<&str>) -> bool {
    format.is_some_and(|f| f.eq_ignore_ascii_case("json"))
}

/// Build an OTLP-exporting provider when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
///
/// Exporter failures are reported on stderr and tracing falls back to local
/// output only.
fn build_provider(service_name: &str) -> Option<SdkTracerProvider> {
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok()?;

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| eprintln!("[formcoach] OTLP exporter init failed: {e}"))
        .ok()?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_string())
        .build();

    Some(
        SdkTracerProvider::builder()
            .with_resource(resource)
            // Simple exporter: the CLI builds its Tokio runtime only after
            // calling `init_tracing`, so nothing may spawn tasks here.
            .with_simple_exporter(exporter)
            .build(),
    )
}
