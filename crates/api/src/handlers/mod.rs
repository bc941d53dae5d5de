//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod locks;
pub mod notes;
