//! Domain services for Hostwatch.
//!
//! Services contain the monitoring logic and operate on domain models
//! through the store and status source traits.

pub mod history;
pub mod merge;
pub mod notifier;
pub mod reconciler;
pub mod registry;
pub mod status_source;
pub mod users;

pub use history::{device_status_log, samples_from_hosts};
pub use merge::merge_by_identity;
pub use notifier::ChangeNotifier;
pub use reconciler::{reconcile_with, HostReconciler, Reconciliation, DEFAULT_WARNING_THRESHOLD_MS};
pub use registry::{DeviceRegistry, ReorderOutcome};
pub use status_source::{MockStatusSource, ProbeMap, ProbeResult, SourceError, StatusSource};
pub use users::UserService;
