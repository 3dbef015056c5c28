//! Domain models for Hostwatch.

pub mod alert;
pub mod device;
pub mod host;
pub mod status_sample;
pub mod user;

pub use alert::{AlertHost, AlertKind, AudibleCue, StatusAlert};
pub use device::{Device, DeviceCategory, DeviceInput, DeviceOrder, UpsertDeviceRequest};
pub use host::{HostSnapshot, HostStatus, HostView};
pub use status_sample::{SampleStatus, StatusLogEntry, StatusSample, TimeRange};
pub use user::{CreateUserRequest, LoginRequest, NewUser, Role, UpdateUserRequest, User, UserSummary};
