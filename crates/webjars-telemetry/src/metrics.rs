//! Prometheus metrics for webjars.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `webjars_deliveries_total` | Counter | `outcome` | Matched requests by outcome |
//! | `webjars_resolution_cache_total` | Counter | `result` | Cache lookups by hit/miss |
//! | `webjars_indexed_assets` | Gauge | - | Entries in the asset index |
//! | `webjars_delivered_bytes` | Histogram | - | Source bytes per served asset |
//!
//! Recording without an installed recorder is a no-op, so library code can
//! call these helpers unconditionally.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Address the Prometheus listener binds (e.g., "0.0.0.0:9090").
    pub addr: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            addr: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Initializes the metrics subsystem.
///
/// Installs the Prometheus recorder globally and spawns its HTTP listener on
/// the current Tokio runtime. Disabled metrics is a no-op.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidAddress` for an unparsable address and
/// `TelemetryError::MetricsInit` if no runtime is active or a recorder is
/// already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|e| TelemetryError::InvalidAddress(format!("{}: {e}", config.addr)))?;

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let (recorder, exporter) = PrometheusBuilder::new()
        .with_http_listener(addr)
        .build()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = recorder.handle();
    metrics::set_global_recorder(recorder)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    runtime.spawn(async move {
        if let Err(e) = exporter.await {
            tracing::error!(error = ?e, "Prometheus exporter stopped");
        }
    });

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    tracing::info!(%addr, "Prometheus metrics listener started");
    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "webjars_deliveries_total",
        "Requests matched by a route pattern, by delivery outcome"
    );
    describe_counter!(
        "webjars_resolution_cache_total",
        "Resolution cache lookups by result"
    );
    describe_gauge!("webjars_indexed_assets", "Number of entries in the asset index");
    describe_histogram!(
        "webjars_delivered_bytes",
        "Uncompressed bytes read from the archive per served asset"
    );
}

/// Delivery outcome label values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryLabel {
    /// Asset streamed to the client.
    Served,
    /// No bundled asset for the path.
    NotFound,
    /// Streaming failed after the asset was opened.
    Error,
}

impl DeliveryLabel {
    /// The label value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Served => "served",
            Self::NotFound => "not_found",
            Self::Error => "error",
        }
    }
}

/// Records the outcome of a matched request.
pub fn record_delivery(outcome: DeliveryLabel) {
    counter!("webjars_deliveries_total", "outcome" => outcome.as_str()).increment(1);
}

/// Records the number of source bytes streamed for a served asset.
#[allow(clippy::cast_precision_loss)]
pub fn record_delivered_bytes(bytes: u64) {
    histogram!("webjars_delivered_bytes").record(bytes as f64);
}

/// Records a resolution cache lookup.
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("webjars_resolution_cache_total", "result" => result).increment(1);
}

/// Sets the indexed asset gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_indexed_assets(count: usize) {
    gauge!("webjars_indexed_assets").set(count as f64);
}
