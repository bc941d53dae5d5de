//! Scribepad domain core.
//!
//! This crate has no internal dependencies so that the database layer, the
//! API server, and tests can all share the same types, error taxonomy, role
//! rules, and lease arithmetic.

pub mod error;
pub mod leases;
pub mod realtime;
pub mod roles;
pub mod types;
