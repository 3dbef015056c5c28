//! Status change alert models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a grouped status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CameOnline,
    WentOffline,
}

/// Audible cue the dashboard should play alongside an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudibleCue {
    Positive,
    Negative,
}

impl AlertKind {
    pub fn cue(&self) -> AudibleCue {
        match self {
            AlertKind::CameOnline => AudibleCue::Positive,
            AlertKind::WentOffline => AudibleCue::Negative,
        }
    }
}

/// Host referenced by an alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertHost {
    pub id: Uuid,
    pub name: String,
    pub ip: String,
}

/// One grouped notification covering every host that moved in one direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAlert {
    pub kind: AlertKind,
    pub cue: AudibleCue,
    pub title: String,
    pub message: String,
    pub hosts: Vec<AlertHost>,
}

impl StatusAlert {
    /// Builds the alert with singular wording for one host, aggregate otherwise.
    pub fn grouped(kind: AlertKind, hosts: Vec<AlertHost>) -> Self {
        let (title, message) = match (kind, hosts.as_slice()) {
            (AlertKind::CameOnline, [host]) => (
                "Host Online".to_string(),
                format!("{} ({}) is online", host.name, host.ip),
            ),
            (AlertKind::CameOnline, many) => (
                "Hosts Online".to_string(),
                format!("{} hosts came online", many.len()),
            ),
            (AlertKind::WentOffline, [host]) => (
                "Host Offline".to_string(),
                format!("{} ({}) went offline", host.name, host.ip),
            ),
            (AlertKind::WentOffline, many) => (
                "Hosts Offline".to_string(),
                format!("{} hosts went offline", many.len()),
            ),
        };

        Self {
            kind,
            cue: kind.cue(),
            title,
            message,
            hosts,
        }
    }
}
