//! Status history models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::host::HostStatus;

/// Status recorded in history. Disabled hosts are never sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleStatus {
    Online,
    Offline,
    Warning,
}

impl SampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleStatus::Online => "online",
            SampleStatus::Offline => "offline",
            SampleStatus::Warning => "warning",
        }
    }

    pub fn from_host_status(status: HostStatus) -> Option<Self> {
        match status {
            HostStatus::Online => Some(SampleStatus::Online),
            HostStatus::Offline => Some(SampleStatus::Offline),
            HostStatus::Warning => Some(SampleStatus::Warning),
            HostStatus::Disabled => None,
        }
    }
}

impl std::str::FromStr for SampleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(SampleStatus::Online),
            "offline" => Ok(SampleStatus::Offline),
            "warning" => Ok(SampleStatus::Warning),
            _ => Err(format!("Invalid sample status: {}", s)),
        }
    }
}

/// A timestamped status observation for one IP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSample {
    pub ip: String,
    pub name: String,
    pub status: SampleStatus,
    pub datetime: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}

/// Chart window accepted by the device status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
}

impl TimeRange {
    /// Parses `15m`, `30m` or `1hr`; anything else falls back to 15 minutes.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some("30m") => TimeRange::ThirtyMinutes,
            Some("1hr") => TimeRange::OneHour,
            _ => TimeRange::FifteenMinutes,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::FifteenMinutes => Duration::minutes(15),
            TimeRange::ThirtyMinutes => Duration::minutes(30),
            TimeRange::OneHour => Duration::minutes(60),
        }
    }
}

/// History entry as returned for a device chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusLogEntry {
    pub device_id: Uuid,
    pub ip: String,
    pub name: String,
    pub status: SampleStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<f64>,
}
