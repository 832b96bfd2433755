//! Trace export
//!
//! Builds the OTLP/HTTP batching exporter, installs it as the process-wide
//! tracer provider and bridges `tracing` spans into it.

use opentelemetry::trace::{SpanId, TraceContextExt, TraceId, TracerProvider as _};
use opentelemetry_otlp::{Protocol, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use std::time::Duration;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

use crate::error::StartupError;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Installed tracer provider.
///
/// [`Telemetry::shutdown`] must run once before the process exits, otherwise
/// spans still queued in the batch processor are lost.
pub struct Telemetry {
    provider: SdkTracerProvider,
    service_name: String,
}

impl Telemetry {
    /// Build the exporter for `traces_endpoint` and register the provider globally
    pub fn init(service_name: &str, traces_endpoint: &str) -> Result<Self, StartupError> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(traces_endpoint)
            .with_protocol(Protocol::HttpBinary)
            .with_timeout(EXPORT_TIMEOUT)
            .build()
            .map_err(|e| StartupError::Telemetry(format!("{traces_endpoint}: {e}")))?;

        let resource = Resource::builder()
            .with_service_name(service_name.to_string())
            .build();

        let provider = SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build();

        opentelemetry::global::set_tracer_provider(provider.clone());

        Ok(Self {
            provider,
            service_name: service_name.to_string(),
        })
    }

    /// `tracing` layer that turns spans into OTel spans on this provider
    pub fn layer<S>(&self) -> impl Layer<S> + Send + Sync
    where
        S: Subscriber + for<'span> LookupSpan<'span> + Send + Sync,
    {
        let tracer = self.provider.tracer(self.service_name.clone());
        tracing_opentelemetry::layer().with_tracer(tracer)
    }

    /// Flush queued spans and stop the exporter
    pub fn shutdown(self) {
        if let Err(e) = self.provider.force_flush() {
            tracing::warn!(error = %e, "Failed to flush tracer provider");
        }
        if let Err(e) = self.provider.shutdown() {
            tracing::error!(error = %e, "Failed to shutdown tracer provider");
        }
    }
}

/// Trace and span ids of a `tracing` span, for log correlation.
///
/// Both are all-zero when no OTel layer is installed.
pub fn trace_ids(span: &tracing::Span) -> (TraceId, SpanId) {
    let context = span.context();
    let otel_span = context.span();
    let span_context = otel_span.span_context();
    (span_context.trace_id(), span_context.span_id())
}
