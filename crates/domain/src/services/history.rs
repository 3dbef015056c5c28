//! Status history queries and sampling.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::models::{Device, HostView, SampleStatus, StatusLogEntry, StatusSample, TimeRange};
use crate::store::HistoryStore;

/// Returns the chart log for `device` over `range`, ascending by time.
///
/// When the window holds no samples the most recent sample for the IP (if
/// any) is returned alone, stamped at `now`, so the chart still shows the
/// last known state.
pub async fn device_status_log(
    history: &dyn HistoryStore,
    device: &Device,
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<Vec<StatusLogEntry>, DomainError> {
    let since = now - range.duration();
    let samples = history.find_since(&device.ip, since).await?;

    if !samples.is_empty() {
        return Ok(samples
            .into_iter()
            .map(|sample| log_entry(device, sample, None))
            .collect());
    }

    let latest = history.find_latest(&device.ip).await?;
    Ok(latest
        .map(|sample| vec![log_entry(device, sample, Some(now))])
        .unwrap_or_default())
}

fn log_entry(device: &Device, sample: StatusSample, stamp: Option<DateTime<Utc>>) -> StatusLogEntry {
    StatusLogEntry {
        device_id: device.id,
        timestamp: stamp.unwrap_or(sample.datetime),
        ip: sample.ip,
        name: sample.name,
        status: sample.status,
        response_time: sample.response_time,
    }
}

/// Turns a reconciled host list into history samples.
///
/// Disabled hosts are not sampled.
pub fn samples_from_hosts(hosts: &[HostView], at: DateTime<Utc>) -> Vec<StatusSample> {
    hosts
        .iter()
        .filter_map(|host| {
            SampleStatus::from_host_status(host.status).map(|status| StatusSample {
                ip: host.ip.clone(),
                name: host.name.clone(),
                status,
                datetime: at,
                response_time: host.response_time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeviceCategory, HostStatus};
    use crate::store::InMemoryHistoryStore;
    use chrono::Duration;
    use uuid::Uuid;

    fn device() -> Device {
        let now = Utc::now();
        Device {
            id: Uuid::new_v4(),
            name: "Router".into(),
            ip: "10.0.0.1".into(),
            category: DeviceCategory::Empresas,
            active: true,
            order: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample(at: DateTime<Utc>, status: SampleStatus) -> StatusSample {
        StatusSample {
            ip: "10.0.0.1".into(),
            name: "Router".into(),
            status,
            datetime: at,
            response_time: Some(5.0),
        }
    }

    #[tokio::test]
    async fn test_log_returns_window_ascending() {
        let now = Utc::now();
        let store = InMemoryHistoryStore::new();
        store
            .append(&[
                sample(now - Duration::minutes(2), SampleStatus::Offline),
                sample(now - Duration::minutes(10), SampleStatus::Online),
                sample(now - Duration::minutes(45), SampleStatus::Online),
            ])
            .await
            .unwrap();

        let device = device();
        let logs = device_status_log(&store, &device, TimeRange::FifteenMinutes, now)
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].status, SampleStatus::Online);
        assert_eq!(logs[1].status, SampleStatus::Offline);
        assert!(logs.iter().all(|l| l.device_id == device.id));

        let logs = device_status_log(&store, &device, TimeRange::OneHour, now)
            .await
            .unwrap();
        assert_eq!(logs.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_window_falls_back_to_latest() {
        let now = Utc::now();
        let store = InMemoryHistoryStore::new();
        store
            .append(&[
                sample(now - Duration::hours(5), SampleStatus::Online),
                sample(now - Duration::hours(3), SampleStatus::Warning),
            ])
            .await
            .unwrap();

        let logs = device_status_log(&store, &device(), TimeRange::ThirtyMinutes, now)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, SampleStatus::Warning);
        assert_eq!(logs[0].timestamp, now);
    }

    #[tokio::test]
    async fn test_no_history_gives_empty_log() {
        let store = InMemoryHistoryStore::new();
        let logs = device_status_log(&store, &device(), TimeRange::default(), Utc::now())
            .await
            .unwrap();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_samples_skip_disabled_hosts() {
        let now = Utc::now();
        let host = |ip: &str, status: HostStatus| HostView {
            id: Uuid::new_v4(),
            name: ip.into(),
            ip: ip.into(),
            category: DeviceCategory::Teste,
            order: 0,
            status,
            uptime: 0,
            last_seen: now,
            response_time: None,
            active: status != HostStatus::Disabled,
        };

        let samples = samples_from_hosts(
            &[
                host("10.0.0.1", HostStatus::Warning),
                host("10.0.0.2", HostStatus::Disabled),
                host("10.0.0.3", HostStatus::Offline),
            ],
            now,
        );
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].status, SampleStatus::Warning);
        assert_eq!(samples[1].ip, "10.0.0.3");
        assert!(samples.iter().all(|s| s.datetime == now));
    }
}
