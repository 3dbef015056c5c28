//! Reconciled host view models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::device::DeviceCategory;

/// Derived health classification of a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    Online,
    Warning,
    Offline,
    Disabled,
}

impl HostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostStatus::Online => "online",
            HostStatus::Warning => "warning",
            HostStatus::Offline => "offline",
            HostStatus::Disabled => "disabled",
        }
    }

    /// Parses a status reported by the external probe.
    ///
    /// Probes only report reachability, so `disabled` and unknown labels
    /// yield `None` and are classified by the reconciler's default.
    pub fn from_probe_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "online" => Some(HostStatus::Online),
            "warning" => Some(HostStatus::Warning),
            "offline" => Some(HostStatus::Offline),
            _ => None,
        }
    }
}

impl fmt::Display for HostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A device combined with its current live status. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostView {
    pub id: Uuid,
    pub name: String,
    pub ip: String,
    pub category: DeviceCategory,
    pub order: i32,
    pub status: HostStatus,
    pub uptime: u64,
    pub last_seen: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
    pub active: bool,
}

/// One published result of a poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    /// Monotonic cycle number; higher is newer.
    pub sequence: u64,
    pub hosts: Vec<HostView>,
    /// True when the status source was unreachable for this cycle.
    pub degraded: bool,
    pub taken_at: DateTime<Utc>,
}

impl HostSnapshot {
    /// Snapshot published before the first poll completes.
    pub fn empty() -> Self {
        Self {
            sequence: 0,
            hosts: Vec::new(),
            degraded: false,
            taken_at: Utc::now(),
        }
    }
}
