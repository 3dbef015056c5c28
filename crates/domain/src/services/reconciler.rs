//! Host status reconciliation.
//!
//! Combines the device registry with live probe results into the per-device
//! [`HostView`] list served to the dashboard. Classification rules:
//!
//! - inactive devices are always `disabled` and the probe is not consulted
//! - when the probe is unreachable every active device is `offline`
//! - an IP missing from the probe result is `offline`
//! - `online` with a response time above the warning threshold is `warning`

use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::merge::merge_by_identity;
use super::status_source::{ProbeMap, ProbeResult, StatusSource};
use crate::error::DomainError;
use crate::models::{Device, HostStatus, HostView};

/// Response time (ms) above which an online host is reported as `warning`.
pub const DEFAULT_WARNING_THRESHOLD_MS: f64 = 80.0;

/// Output of one reconcile pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub hosts: Vec<HostView>,
    /// True when the status source could not be reached.
    pub degraded: bool,
}

/// Reconciles `devices` against `probes`.
///
/// `probes == None` means the status source failed and the result is
/// produced in degraded mode. Pure: the same inputs and `now` always give
/// the same output.
pub fn reconcile_with(
    devices: &[Device],
    probes: Option<&ProbeMap>,
    warning_threshold_ms: f64,
    now: DateTime<Utc>,
) -> Result<Reconciliation, DomainError> {
    if devices.is_empty() {
        return Err(DomainError::NoDevicesConfigured);
    }

    let hosts = devices
        .iter()
        .map(|device| classify(device, probes, warning_threshold_ms, now))
        .collect();

    Ok(Reconciliation {
        hosts: merge_by_identity(hosts),
        degraded: probes.is_none(),
    })
}

fn classify(
    device: &Device,
    probes: Option<&ProbeMap>,
    warning_threshold_ms: f64,
    now: DateTime<Utc>,
) -> HostView {
    let view = |status: HostStatus,
                uptime: u64,
                last_seen: DateTime<Utc>,
                response_time: Option<f64>| HostView {
        id: device.id,
        name: device.name.clone(),
        ip: device.ip.clone(),
        category: device.category,
        order: device.order,
        status,
        uptime,
        last_seen,
        response_time,
        active: device.active,
    };

    if !device.active {
        return view(HostStatus::Disabled, 0, now, None);
    }

    match probes.and_then(|probes| probes.get(&device.ip)) {
        Some(probe) => {
            let status = derive_status(probe, warning_threshold_ms);
            let uptime = probe
                .uptime
                .filter(|secs| secs.is_finite() && *secs > 0.0)
                .map(|secs| secs as u64)
                .unwrap_or(0);
            view(
                status,
                uptime,
                probe.last_seen.unwrap_or(now),
                probe.response_time,
            )
        }
        None => view(HostStatus::Offline, 0, now, None),
    }
}

fn derive_status(probe: &ProbeResult, warning_threshold_ms: f64) -> HostStatus {
    match probe.status {
        Some(HostStatus::Online)
            if probe
                .response_time
                .is_some_and(|ms| ms > warning_threshold_ms) =>
        {
            HostStatus::Warning
        }
        Some(HostStatus::Disabled) | None => HostStatus::Offline,
        Some(status) => status,
    }
}

/// Fetches probe results and reconciles them with the registry.
#[derive(Clone)]
pub struct HostReconciler {
    source: Arc<dyn StatusSource>,
    warning_threshold_ms: f64,
}

impl HostReconciler {
    pub fn new(source: Arc<dyn StatusSource>, warning_threshold_ms: f64) -> Self {
        Self {
            source,
            warning_threshold_ms,
        }
    }

    pub fn warning_threshold_ms(&self) -> f64 {
        self.warning_threshold_ms
    }

    /// Reconciles `devices` against the live source.
    ///
    /// Source failures never surface as errors; they switch the pass into
    /// degraded mode. The probe is not called for an empty registry.
    pub async fn reconcile(&self, devices: &[Device]) -> Result<Reconciliation, DomainError> {
        if devices.is_empty() {
            return Err(DomainError::NoDevicesConfigured);
        }

        let probes = match self.source.fetch_all().await {
            Ok(probes) => Some(probes),
            Err(e) => {
                tracing::warn!(error = %e, "Status source unavailable, reporting hosts offline");
                None
            }
        };

        reconcile_with(devices, probes.as_ref(), self.warning_threshold_ms, Utc::now())
    }
}
