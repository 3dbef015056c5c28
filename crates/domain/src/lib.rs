//! Domain layer for the Hostwatch backend.
//!
//! This crate contains:
//! - Domain models (Device, HostView, StatusSample, User, alerts)
//! - Storage and status-source contracts, with in-memory implementations
//! - Business logic services (registry, reconciler, notifier, history, users)
//! - Domain error types

pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use error::DomainError;
