//! Prometheus metrics middleware and monitor metrics.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::models::{AlertKind, HostSnapshot, HostStatus};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `hostwatch_http_requests_total` and
/// `hostwatch_http_request_duration_seconds`, labelled by matched route.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();

    counter!(
        "hostwatch_http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "hostwatch_http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Counts hosts per status in a snapshot, in a fixed status order.
pub fn status_counts(snapshot: &HostSnapshot) -> [(HostStatus, usize); 4] {
    let mut counts = [
        (HostStatus::Online, 0),
        (HostStatus::Warning, 0),
        (HostStatus::Offline, 0),
        (HostStatus::Disabled, 0),
    ];
    for host in &snapshot.hosts {
        if let Some(entry) = counts.iter_mut().find(|(status, _)| *status == host.status) {
            entry.1 += 1;
        }
    }
    counts
}

/// Publishes the `hostwatch_hosts` gauge per status and counts degraded cycles.
pub fn record_snapshot(snapshot: &HostSnapshot) {
    for (status, count) in status_counts(snapshot) {
        gauge!("hostwatch_hosts", "status" => status.as_str()).set(count as f64);
    }
    if snapshot.degraded {
        counter!("hostwatch_degraded_cycles_total").increment(1);
    }
}

pub fn record_alert(kind: AlertKind) {
    let label = match kind {
        AlertKind::CameOnline => "came_online",
        AlertKind::WentOffline => "went_offline",
    };
    counter!("hostwatch_alerts_total", "kind" => label).increment(1);
}

pub fn record_history_samples(count: u64) {
    counter!("hostwatch_history_samples_total").increment(count);
}

/// Handler for `GET /metrics` in Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder.
///
/// Must run once at startup before any metric is recorded. A second call is
/// a no-op.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus handle already initialized");
    }
    Ok(())
}
