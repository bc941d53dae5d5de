//! Well-known role names and the permission rules built on them.
//!
//! Roles are stored as plain text on the `users` row and embedded in JWT
//! claims, so these constants must match the CHECK constraint in the users
//! migration.

use crate::types::DbId;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";
pub const ROLE_GUEST: &str = "guest";

/// The set of roles accepted at registration time.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER, ROLE_GUEST];

/// Returns `true` if the given role name is one of the known roles.
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

/// Guests are read-only; admins and users may create notes and take locks.
pub fn can_author(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_USER
}

/// Admins may modify any note; users only notes they own; guests nothing.
pub fn can_modify(role: &str, owner_id: DbId, user_id: DbId) -> bool {
    role == ROLE_ADMIN || (role == ROLE_USER && owner_id == user_id)
}
