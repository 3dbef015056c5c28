//! Status change detection.
//!
//! [`ChangeNotifier`] diffs successive host snapshots and emits at most one
//! grouped alert per direction (came online, went offline) for each
//! snapshot. The first non-empty snapshot only records a baseline.

use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{AlertHost, AlertKind, HostStatus, HostView, StatusAlert};

/// Remembers the last observed status of every host.
#[derive(Debug)]
pub struct ChangeNotifier {
    previous: HashMap<Uuid, HostStatus>,
    first_load: bool,
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self {
            previous: HashMap::new(),
            first_load: true,
        }
    }

    /// Forgets the baseline; the next snapshot is treated as a first load.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.first_load = true;
    }

    pub fn has_baseline(&self) -> bool {
        !self.first_load
    }

    /// Feeds one snapshot and returns the alerts it triggers.
    pub fn observe(&mut self, hosts: &[HostView]) -> Vec<StatusAlert> {
        if hosts.is_empty() {
            return Vec::new();
        }

        if self.first_load {
            self.record(hosts);
            self.first_load = false;
            return Vec::new();
        }

        let mut came_online = Vec::new();
        let mut went_offline = Vec::new();

        for host in hosts {
            if host.status == HostStatus::Disabled {
                continue;
            }
            let previous = match self.previous.get(&host.id) {
                Some(previous) => *previous,
                None => continue,
            };
            if previous == host.status {
                continue;
            }
            // Re-enabled hosts have no usable baseline; only a return to
            // online is announced.
            if previous == HostStatus::Disabled && host.status != HostStatus::Online {
                continue;
            }

            let entry = AlertHost {
                id: host.id,
                name: host.name.clone(),
                ip: host.ip.clone(),
            };
            match host.status {
                HostStatus::Online => came_online.push(entry),
                HostStatus::Offline => went_offline.push(entry),
                HostStatus::Warning | HostStatus::Disabled => {}
            }
        }

        self.record(hosts);

        let mut alerts = Vec::new();
        if !came_online.is_empty() {
            alerts.push(StatusAlert::grouped(AlertKind::CameOnline, came_online));
        }
        if !went_offline.is_empty() {
            alerts.push(StatusAlert::grouped(AlertKind::WentOffline, went_offline));
        }
        alerts
    }

    fn record(&mut self, hosts: &[HostView]) {
        self.previous = hosts.iter().map(|h| (h.id, h.status)).collect();
    }
}
