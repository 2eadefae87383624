//! OpenTelemetry pipeline construction.
//!
//! Builds the tracer provider for the process: resource attributes carrying
//! agent metadata, the identity-stamping processor ahead of all exporters,
//! an OTLP exporter towards the configured endpoint, and optionally a
//! stdout exporter for debugging.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::{KeyValue, global};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::trace::{Config, Tracer, TracerProvider};

use crate::api::AgentInfo;
use crate::config::SdkConfig;
use crate::processor::IdentitySpanProcessor;
use crate::semconv;
use value_core::{Result, ValueSdkError};

/// Instrumentation scope name for all SDK-emitted spans.
pub const TRACER_SCOPE: &str = "value.sdk";

/// How exported spans leave the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportMode {
    /// Background batch export on the tokio runtime. Requires an active
    /// runtime; the right choice for async hosts.
    Batch,
    /// Synchronous export at span end. No runtime required; used by
    /// blocking hosts.
    Simple,
}

/// Process-level resource attributes for every span the provider emits.
fn build_resource(service_name: &str, agent: &AgentInfo) -> Resource {
    Resource::new(vec![
        KeyValue::new("service.name", service_name.to_string()),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        KeyValue::new(semconv::CLIENT_SDK, semconv::CLIENT_SDK_NAME),
        KeyValue::new(
            semconv::AGENT_ORGANIZATION_ID,
            agent.organization_id.clone(),
        ),
        KeyValue::new(semconv::AGENT_WORKSPACE_ID, agent.workspace_id.clone()),
        KeyValue::new(semconv::AGENT_NAME, agent.name.clone()),
    ])
}

/// Build and globally install the tracer provider, returning it together
/// with the SDK tracer.
pub fn init_tracing(
    config: &SdkConfig,
    agent: &AgentInfo,
    mode: ExportMode,
) -> Result<(TracerProvider, Tracer)> {
    let mut builder = TracerProvider::builder()
        .with_config(Config::default().with_resource(build_resource(&config.service_name, agent)))
        // Identity stamping has to run before any exporter sees the span.
        .with_span_processor(IdentitySpanProcessor);

    builder = match mode {
        ExportMode::Batch => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(config.otel_endpoint.clone())
                .build_span_exporter()
                .map_err(|e| ValueSdkError::Trace(format!("building OTLP exporter: {e}")))?;
            builder.with_batch_exporter(exporter, runtime::Tokio)
        }
        // Tonic channels need an ambient tokio runtime even to construct,
        // so blocking hosts ship spans over OTLP/HTTP instead.
        ExportMode::Simple => {
            let exporter = opentelemetry_otlp::new_exporter()
                .http()
                .with_endpoint(config.otel_endpoint.clone())
                .build_span_exporter()
                .map_err(|e| ValueSdkError::Trace(format!("building OTLP exporter: {e}")))?;
            builder.with_simple_exporter(exporter)
        }
    };

    if config.console_export {
        builder = builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default());
    }

    let provider = builder.build();
    global::set_tracer_provider(provider.clone());
    let tracer = provider.tracer(TRACER_SCOPE);
    Ok((provider, tracer))
}
