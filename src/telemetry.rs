use anyhow::Context;
use opentelemetry::trace::TracerProvider;
use tracing_subscriber::{
    EnvFilter, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::otel::{self, Providers, SERVICE_NAME};

/// Installs the global subscriber. OTLP export is wired only when an endpoint is given.
pub fn init_telemetry(otlp_endpoint: Option<&str>) -> anyhow::Result<Option<Providers>> {
    let providers = otlp_endpoint.map(otel::init_providers).transpose()?;

    let otel_layer = providers.as_ref().map(|providers| {
        opentelemetry::global::set_tracer_provider(providers.tracer.clone());
        opentelemetry::global::set_meter_provider(providers.meter.clone());
        tracing_opentelemetry::layer().with_tracer(providers.tracer.tracer(SERVICE_NAME))
    });

    let fmt_layer = tracing_subscriber::fmt::layer().with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(providers)
}
