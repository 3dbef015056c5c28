//! HTTP client for the external ping engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::models::HostStatus;
use domain::services::{ProbeMap, ProbeResult, SourceError, StatusSource};
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use tracing::debug;

use crate::config::StatusSourceConfig;

/// One entry of the `hosts` array returned by `GET /api/hosts`.
///
/// Only `ip` is required; malformed optional fields are read as absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProbe {
    ip: String,
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_number")]
    uptime: Option<f64>,
    #[serde(default)]
    last_seen: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_number")]
    response_time: Option<f64>,
}

impl RawProbe {
    fn into_result(self) -> (String, ProbeResult) {
        let result = ProbeResult {
            status: self
                .status
                .as_ref()
                .and_then(serde_json::Value::as_str)
                .and_then(HostStatus::from_probe_label),
            response_time: self.response_time,
            uptime: self.uptime,
            last_seen: self.last_seen.as_ref().and_then(parse_last_seen),
        };
        (self.ip, result)
    }
}

/// Numbers or numeric strings; anything else is absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Accepts RFC 3339 strings or epoch milliseconds; anything else is absent.
fn parse_last_seen(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        serde_json::Value::Number(n) => {
            n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        _ => None,
    }
}

/// Builds the probe map from a `GET /api/hosts` body.
///
/// A missing or non-array `hosts` gives an empty map. Entries that cannot be
/// read (no `ip`, not an object) are skipped on their own.
fn into_probe_map(body: serde_json::Value) -> ProbeMap {
    let serde_json::Value::Object(mut body) = body else {
        return ProbeMap::new();
    };
    let Some(serde_json::Value::Array(hosts)) = body.remove("hosts") else {
        return ProbeMap::new();
    };

    hosts
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawProbe>(entry) {
            Ok(raw) => Some(raw.into_result()),
            Err(e) => {
                debug!(error = %e, "Skipping malformed host entry");
                None
            }
        })
        .collect()
}

/// [`StatusSource`] backed by the ping engine's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: Client,
    base_url: String,
    timeout: Duration,
    history_timeout: Duration,
}

impl HttpStatusSource {
    pub fn new(config: &StatusSourceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
            history_timeout: Duration::from_millis(config.history_timeout_ms),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn unavailable(e: reqwest::Error) -> SourceError {
    if e.is_timeout() {
        SourceError::Unavailable("request timed out".to_string())
    } else {
        SourceError::Unavailable(e.to_string())
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_all(&self) -> Result<ProbeMap, SourceError> {
        let url = self.url("/api/hosts");
        debug!(url = %url, "Fetching host status");

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!("HTTP {}", status)));
        }

        let body: serde_json::Value = response.json().await.map_err(unavailable)?;
        Ok(into_probe_map(body))
    }

    async fn fetch_history(
        &self,
        ip: &str,
        minutes: u32,
    ) -> Result<serde_json::Value, SourceError> {
        let url = self.url("/status-history");
        debug!(url = %url, ip = %ip, minutes, "Fetching status history");

        let response = self
            .client
            .get(&url)
            .query(&[("ip", ip.to_string()), ("minutes", minutes.to_string())])
            .timeout(self.history_timeout)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!("HTTP {}", status)));
        }

        response.json().await.map_err(unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> ProbeMap {
        into_probe_map(value)
    }

    #[test]
    fn test_parses_full_probe() {
        let probes = parse(json!({
            "hosts": [{
                "ip": "10.0.0.5",
                "status": "online",
                "uptime": 3600.5,
                "lastSeen": "2024-06-01T12:00:00Z",
                "responseTime": 12.5
            }]
        }));

        let probe = &probes["10.0.0.5"];
        assert_eq!(probe.status, Some(HostStatus::Online));
        assert_eq!(probe.uptime, Some(3600.5));
        assert_eq!(probe.response_time, Some(12.5));
        assert_eq!(
            probe.last_seen.unwrap().to_rfc3339(),
            "2024-06-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_unknown_status_is_none() {
        let probes = parse(json!({"hosts": [{"ip": "10.0.0.1", "status": "flapping"}]}));
        assert_eq!(probes["10.0.0.1"].status, None);
    }

    #[test]
    fn test_unparseable_last_seen_is_absent() {
        let probes = parse(json!({
            "hosts": [
                {"ip": "10.0.0.1", "status": "offline", "lastSeen": "yesterday"},
                {"ip": "10.0.0.2", "status": "offline", "lastSeen": true}
            ]
        }));
        assert!(probes["10.0.0.1"].last_seen.is_none());
        assert!(probes["10.0.0.2"].last_seen.is_none());
    }

    #[test]
    fn test_epoch_millis_last_seen() {
        let probes = parse(json!({"hosts": [{"ip": "10.0.0.1", "lastSeen": 1717243200000_i64}]}));
        assert_eq!(
            probes["10.0.0.1"].last_seen.unwrap().to_rfc3339(),
            "2024-06-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_missing_hosts_key_is_empty() {
        assert!(parse(json!({})).is_empty());
        assert!(parse(json!({"hosts": null})).is_empty());
        assert!(parse(json!({"hosts": "none"})).is_empty());
        assert!(parse(json!([])).is_empty());
    }

    #[test]
    fn test_malformed_entry_does_not_hide_others() {
        let probes = parse(json!({
            "hosts": [
                {"ip": "10.0.0.1", "status": "online", "responseTime": 4.0},
                {"status": "offline"},
                "garbage",
                {"ip": 7, "status": "online"}
            ]
        }));

        assert_eq!(probes.len(), 1);
        assert_eq!(probes["10.0.0.1"].status, Some(HostStatus::Online));
    }

    #[test]
    fn test_lenient_numeric_fields() {
        let probes = parse(json!({
            "hosts": [
                {"ip": "10.0.0.1", "uptime": "3600", "responseTime": " 12.5 "},
                {"ip": "10.0.0.2", "uptime": "soon", "responseTime": null},
                {"ip": "10.0.0.3", "uptime": "NaN", "status": 1}
            ]
        }));

        assert_eq!(probes["10.0.0.1"].uptime, Some(3600.0));
        assert_eq!(probes["10.0.0.1"].response_time, Some(12.5));
        assert_eq!(probes["10.0.0.2"].uptime, None);
        assert_eq!(probes["10.0.0.2"].response_time, None);
        assert_eq!(probes["10.0.0.3"].uptime, None);
        assert_eq!(probes["10.0.0.3"].status, None);
    }

    /// Serves `body` on `GET /api/hosts` from an ephemeral local port.
    async fn serve_hosts(body: serde_json::Value) -> String {
        let router = axum::Router::new().route(
            "/api/hosts",
            axum::routing::get(move || {
                let body = body.clone();
                async move { axum::Json(body) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_bad_entry_keeps_healthy_host_online() {
        let base_url = serve_hosts(json!({
            "hosts": [
                {"ip": "10.0.0.1", "status": "online", "responseTime": 5, "uptime": "120"},
                {"status": "offline", "uptime": "n/a"}
            ]
        }))
        .await;
        let source = HttpStatusSource::new(&StatusSourceConfig {
            base_url,
            timeout_ms: 2000,
            history_timeout_ms: 2000,
        })
        .unwrap();

        let now = Utc::now();
        let device = domain::models::Device {
            id: uuid::Uuid::new_v4(),
            name: "router".into(),
            ip: "10.0.0.1".into(),
            category: domain::models::DeviceCategory::Empresas,
            active: true,
            order: 1,
            created_at: now,
            updated_at: now,
        };
        let reconciler = domain::services::HostReconciler::new(
            std::sync::Arc::new(source),
            domain::services::DEFAULT_WARNING_THRESHOLD_MS,
        );

        let result = reconciler.reconcile(&[device]).await.unwrap();

        assert!(!result.degraded);
        assert_eq!(result.hosts[0].status, HostStatus::Online);
        assert_eq!(result.hosts[0].uptime, 120);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let source = HttpStatusSource::new(&StatusSourceConfig {
            base_url: "http://ping.local:8000/".to_string(),
            timeout_ms: 5000,
            history_timeout_ms: 10000,
        })
        .unwrap();
        assert_eq!(source.url("/api/hosts"), "http://ping.local:8000/api/hosts");
    }

    #[tokio::test]
    async fn test_unreachable_source_is_unavailable() {
        let source = HttpStatusSource::new(&StatusSourceConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_ms: 500,
            history_timeout_ms: 500,
        })
        .unwrap();
        assert!(matches!(
            source.fetch_all().await,
            Err(SourceError::Unavailable(_))
        ));
    }
}
