//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Domain outcome enums where an operation has more results than Ok/Err

pub mod lock;
pub mod note;
pub mod session;
pub mod user;
