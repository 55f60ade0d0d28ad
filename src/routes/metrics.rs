use axum::extract::State;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// GET /metrics — job and upstream metrics in Prometheus text format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> String {
    handle.render()
}
