//! Alert worker: the single consumer of host snapshots for notifications.

use domain::models::HostSnapshot;
use domain::services::ChangeNotifier;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::middleware::metrics::record_alert;
use crate::services::{AlertFeed, SnapshotHub};

/// Feeds one snapshot to the notifier and pushes the resulting alerts.
///
/// A degraded snapshot resets the notifier and is not observed, so recovery
/// from an outage starts from a fresh baseline. Returns the number of alerts
/// raised.
pub fn process_snapshot(
    notifier: &mut ChangeNotifier,
    snapshot: &HostSnapshot,
    feed: &AlertFeed,
) -> usize {
    if snapshot.degraded {
        notifier.reset();
        return 0;
    }

    let alerts = notifier.observe(&snapshot.hosts);
    let raised = alerts.len();

    for alert in alerts {
        info!(
            kind = ?alert.kind,
            hosts = alert.hosts.len(),
            title = %alert.title,
            message = %alert.message,
            "Host status alert"
        );
        record_alert(alert.kind);
        feed.push(alert);
    }

    raised
}

/// Spawns the worker. It processes every published snapshot in order and
/// stops when `shutdown` turns true or the hub is dropped.
///
/// If the worker falls behind the hub buffer the skipped transitions are
/// unknown, so the notifier is reset and the next snapshot is a new baseline.
pub fn spawn_alert_worker(
    hub: &SnapshotHub,
    feed: Arc<AlertFeed>,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let mut snapshots = hub.stream();

    tokio::spawn(async move {
        let mut notifier = ChangeNotifier::new();
        info!("Alert worker started");

        loop {
            tokio::select! {
                received = snapshots.recv() => match received {
                    Ok(snapshot) => {
                        process_snapshot(&mut notifier, &snapshot, &feed);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Alert worker lagged, resetting baseline");
                        notifier.reset();
                    }
                    Err(RecvError::Closed) => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Alert worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domain::models::{AlertKind, DeviceCategory, HostStatus, HostView};
    use std::time::Duration;
    use uuid::Uuid;

    fn host(id: Uuid, status: HostStatus) -> HostView {
        HostView {
            id,
            name: format!("host-{}", &id.to_string()[..4]),
            ip: "10.0.0.1".into(),
            category: DeviceCategory::Teste,
            order: 1,
            status,
            uptime: 0,
            last_seen: Utc::now(),
            response_time: None,
            active: true,
        }
    }

    fn snapshot(sequence: u64, hosts: Vec<HostView>, degraded: bool) -> HostSnapshot {
        HostSnapshot {
            sequence,
            hosts,
            degraded,
            taken_at: Utc::now(),
        }
    }

    #[test]
    fn test_transition_raises_alert() {
        let a = Uuid::new_v4();
        let feed = AlertFeed::new(10);
        let mut notifier = ChangeNotifier::new();

        let first = snapshot(1, vec![host(a, HostStatus::Online)], false);
        let second = snapshot(2, vec![host(a, HostStatus::Offline)], false);

        assert_eq!(process_snapshot(&mut notifier, &first, &feed), 0);
        assert_eq!(process_snapshot(&mut notifier, &second, &feed), 1);

        let (entries, _) = feed.since(None);
        assert_eq!(entries[0].alert.kind, AlertKind::WentOffline);
    }

    #[test]
    fn test_degraded_snapshot_resets_baseline() {
        let a = Uuid::new_v4();
        let feed = AlertFeed::new(10);
        let mut notifier = ChangeNotifier::new();

        process_snapshot(
            &mut notifier,
            &snapshot(1, vec![host(a, HostStatus::Online)], false),
            &feed,
        );
        process_snapshot(
            &mut notifier,
            &snapshot(2, vec![host(a, HostStatus::Offline)], true),
            &feed,
        );
        assert!(!notifier.has_baseline());

        // Recovery is a first load again: no alert.
        let raised = process_snapshot(
            &mut notifier,
            &snapshot(3, vec![host(a, HostStatus::Offline)], false),
            &feed,
        );
        assert_eq!(raised, 0);
        assert!(feed.is_empty());
    }

    #[tokio::test]
    async fn test_worker_consumes_published_snapshots() {
        let hub = SnapshotHub::new();
        let feed = Arc::new(AlertFeed::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_alert_worker(&hub, Arc::clone(&feed), shutdown_rx);

        let a = Uuid::new_v4();
        hub.publish(snapshot(hub.next_sequence(), vec![host(a, HostStatus::Offline)], false));
        tokio::time::sleep(Duration::from_millis(50)).await;
        hub.publish(snapshot(hub.next_sequence(), vec![host(a, HostStatus::Online)], false));

        let mut waited = 0;
        while feed.is_empty() && waited < 40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            waited += 1;
        }
        assert_eq!(feed.len(), 1);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_worker_sees_every_step_of_a_burst() {
        let hub = SnapshotHub::new();
        let feed = Arc::new(AlertFeed::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_alert_worker(&hub, Arc::clone(&feed), shutdown_rx);

        // Published back to back: the worker must still see the offline step.
        let a = Uuid::new_v4();
        for status in [HostStatus::Online, HostStatus::Offline, HostStatus::Online] {
            hub.publish(snapshot(hub.next_sequence(), vec![host(a, status)], false));
        }

        let mut waited = 0;
        while feed.len() < 2 && waited < 40 {
            tokio::time::sleep(Duration::from_millis(25)).await;
            waited += 1;
        }
        let (entries, _) = feed.since(None);
        let kinds: Vec<_> = entries.iter().map(|e| e.alert.kind).collect();
        assert_eq!(kinds, vec![AlertKind::WentOffline, AlertKind::CameOnline]);

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
