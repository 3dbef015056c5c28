//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod device;
pub mod status_sample;
pub mod user;

pub use device::DeviceEntity;
pub use status_sample::StatusSampleEntity;
pub use user::UserEntity;
