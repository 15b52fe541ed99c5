//! Prometheus metrics for refinement runs.
//!
//! Recorders go through the `metrics` facade, so they are no-ops until a
//! recorder is installed. [`MetricsServer`] installs the Prometheus exporter
//! with an HTTP scrape endpoint.
//!
//! # Example
//!
//! ```rust,no_run
//! use copy_refinery_runtime::metrics::MetricsServer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Start metrics server on port 9090
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Metrics available at http://localhost:9090/metrics
//! # Ok(())
//! # }
//! ```

use copy_refinery_core::{StopReason, Variant};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
}

/// Prometheus metrics server.
///
/// Exposes metrics on an HTTP endpoint for Prometheus scraping.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    ///
    /// # Arguments
    ///
    /// * `addr` - Socket address to bind to (e.g., `0.0.0.0:9090`)
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Install the recorder and start the HTTP listener.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built.
    ///
    /// # Note
    ///
    /// If a metrics recorder is already installed (e.g., in tests), this logs
    /// a warning and leaves the existing recorder in place.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        describe_metrics();

        let (recorder, exporter) = PrometheusBuilder::new()
            .with_http_listener(self.addr)
            .set_buckets_for_metric(
                Matcher::Full("copy_refinery_final_score".to_string()),
                &[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?
            .build()
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
            return Ok(());
        }

        tokio::spawn(async move {
            if let Err(_e) = exporter.await {
                // ExporterError implements neither Debug nor Display in metrics-exporter-prometheus 0.15.
                tracing::error!("metrics exporter stopped");
            }
        });

        self.handle = Some(handle);
        tracing::info!(
            addr = %self.addr,
            "Metrics server started - available at http://{}/metrics",
            self.addr
        );
        Ok(())
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
pub fn describe_metrics() {
    describe_counter!(
        "copy_refinery_runs_total",
        "Completed refinement runs by stop reason"
    );
    describe_counter!(
        "copy_refinery_generation_failures_total",
        "Generator calls that failed after edge retries"
    );
    describe_counter!(
        "copy_refinery_ab_selections_total",
        "A/B selections by winning variant"
    );
    describe_counter!(
        "copy_refinery_pipeline_errors_total",
        "Products that produced no report"
    );
    describe_histogram!(
        "copy_refinery_final_score",
        "Overall score of the final candidate of each run"
    );
    describe_histogram!(
        "copy_refinery_iterations",
        "Rewrites generated and scored per run"
    );
    describe_histogram!(
        "copy_refinery_product_duration_seconds",
        "Wall time to produce one product report"
    );
}

/// Refinement run metrics recorder.
pub struct RunMetrics;

impl RunMetrics {
    /// Record a finished refinement run.
    pub fn record_run(stop_reason: StopReason, iterations: u32, final_score: f64) {
        counter!("copy_refinery_runs_total", "stop_reason" => stop_reason.as_str()).increment(1);
        histogram!("copy_refinery_iterations").record(f64::from(iterations));
        histogram!("copy_refinery_final_score").record(final_score);
    }

    /// Record a generator failure seen by the runtime.
    pub fn record_generation_failure() {
        counter!("copy_refinery_generation_failures_total").increment(1);
    }

    /// Record an A/B winner.
    pub fn record_selection(variant: Variant) {
        counter!("copy_refinery_ab_selections_total", "variant" => variant.label()).increment(1);
    }
}

/// Pipeline metrics recorder.
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record a product that produced a report.
    pub fn record_product(duration: Duration) {
        histogram!("copy_refinery_product_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a product that produced no report.
    pub fn record_error(kind: &'static str) {
        counter!("copy_refinery_pipeline_errors_total", "kind" => kind).increment(1);
    }
}
