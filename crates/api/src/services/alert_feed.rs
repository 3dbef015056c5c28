//! Bounded in-memory feed of recent status alerts.

use chrono::{DateTime, Utc};
use domain::models::StatusAlert;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;

/// An alert with its feed id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: u64,
    pub raised_at: DateTime<Utc>,
    #[serde(flatten)]
    pub alert: StatusAlert,
}

#[derive(Debug, Default)]
struct FeedInner {
    entries: VecDeque<FeedEntry>,
    last_id: u64,
}

/// Ring buffer of the most recent alerts; ids increase monotonically and
/// survive eviction, so clients can poll with the last id they saw.
#[derive(Debug)]
pub struct AlertFeed {
    capacity: usize,
    inner: Mutex<FeedInner>,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(FeedInner::default()),
        }
    }

    /// Appends an alert, evicting the oldest when full. Returns its id.
    pub fn push(&self, alert: StatusAlert) -> u64 {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.last_id += 1;
        let id = inner.last_id;

        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(FeedEntry {
            id,
            raised_at: Utc::now(),
            alert,
        });
        id
    }

    /// Entries with an id greater than `after` (all when `None`), oldest
    /// first, together with the latest id issued so far.
    pub fn since(&self, after: Option<u64>) -> (Vec<FeedEntry>, u64) {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let after = after.unwrap_or(0);
        let entries = inner
            .entries
            .iter()
            .filter(|entry| entry.id > after)
            .cloned()
            .collect();
        (entries, inner.last_id)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
