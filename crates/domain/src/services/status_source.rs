//! Status source abstraction.
//!
//! The external ping engine is consumed through the [`StatusSource`] trait so
//! the reconciler can be driven by an HTTP client in production and by
//! [`MockStatusSource`] in tests.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;

use crate::models::HostStatus;

/// Live status reported for one IP by the external probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeResult {
    /// `None` when the probe reported a label we do not recognize.
    pub status: Option<HostStatus>,
    pub response_time: Option<f64>,
    /// Seconds.
    pub uptime: Option<f64>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl ProbeResult {
    pub fn new(status: HostStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_response_time(mut self, ms: f64) -> Self {
        self.response_time = Some(ms);
        self
    }

    pub fn with_uptime(mut self, secs: f64) -> Self {
        self.uptime = Some(secs);
        self
    }

    pub fn with_last_seen(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen = Some(at);
        self
    }
}

/// Probe results keyed by IP.
pub type ProbeMap = HashMap<String, ProbeResult>;

/// Errors reported by a status source.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Status source unavailable: {0}")]
    Unavailable(String),
}

/// External provider of live host status.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    /// Current status of every IP the probe knows about.
    async fn fetch_all(&self) -> Result<ProbeMap, SourceError>;

    /// Raw status history for one IP over the last `minutes`.
    async fn fetch_history(&self, ip: &str, minutes: u32)
        -> Result<serde_json::Value, SourceError>;
}

/// Scripted status source for development and testing.
#[derive(Debug)]
pub struct MockStatusSource {
    probes: Mutex<Option<ProbeMap>>,
    history: Mutex<Option<serde_json::Value>>,
    fetches: AtomicUsize,
}

impl Default for MockStatusSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStatusSource {
    /// A reachable source that knows no IPs.
    pub fn new() -> Self {
        Self::with_probes(ProbeMap::new())
    }

    pub fn with_probes(probes: ProbeMap) -> Self {
        Self {
            probes: Mutex::new(Some(probes)),
            history: Mutex::new(Some(serde_json::Value::Array(Vec::new()))),
            fetches: AtomicUsize::new(0),
        }
    }

    /// A source that fails every call.
    pub fn failing() -> Self {
        Self {
            probes: Mutex::new(None),
            history: Mutex::new(None),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn set_probes(&self, probes: ProbeMap) {
        *self.probes.lock().unwrap_or_else(|e| e.into_inner()) = Some(probes);
    }

    pub fn set_unavailable(&self) {
        *self.probes.lock().unwrap_or_else(|e| e.into_inner()) = None;
        *self.history.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn set_history(&self, history: serde_json::Value) {
        *self.history.lock().unwrap_or_else(|e| e.into_inner()) = Some(history);
    }

    /// Number of `fetch_all` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StatusSource for MockStatusSource {
    async fn fetch_all(&self) -> Result<ProbeMap, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.probes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| SourceError::Unavailable("Simulated failure".to_string()))
    }

    async fn fetch_history(
        &self,
        ip: &str,
        minutes: u32,
    ) -> Result<serde_json::Value, SourceError> {
        tracing::debug!(ip = %ip, minutes, "Mock: serving status history");
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| SourceError::Unavailable("Simulated failure".to_string()))
    }
}
