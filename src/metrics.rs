use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. The recorder is process-global, so
    /// repeated calls hand back the first handle.
    pub fn init() -> anyhow::Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_try_init(|| PrometheusBuilder::new().install_recorder())?
            .clone();
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("graph_requests_total", "Graph GET requests issued.");
        describe_counter!(
            "graph_request_errors_total",
            "Graph requests that failed or returned a non-success status."
        );
        describe_counter!(
            "sweep_runs_total",
            "Export sweeps by operation and outcome."
        );
        describe_histogram!("sweep_duration_ms", "Export sweep wall time in milliseconds.");
    });
}
