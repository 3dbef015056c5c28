//! Shared utilities for the Hostwatch backend.
//!
//! This crate provides functionality used across the other crates:
//! - Password hashing with Argon2id
//! - Signed access tokens (HS256 JWT)
//! - Common validation logic

pub mod jwt;
pub mod password;
pub mod validation;
