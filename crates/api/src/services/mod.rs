//! Application services and external integrations.

pub mod admin_bootstrap;
pub mod alert_feed;
pub mod snapshot_hub;
pub mod status_source;

pub use admin_bootstrap::{bootstrap_master, BootstrapError, BootstrapOutcome};
pub use alert_feed::{AlertFeed, FeedEntry};
pub use snapshot_hub::SnapshotHub;
pub use status_source::HttpStatusSource;
