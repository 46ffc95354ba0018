//! Well-known role name constants.
//!
//! Users carry a single `is_admin` flag in the database; the role name is what
//! ends up in access-token claims.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Map the stored admin flag to a role name.
pub fn role_name(is_admin: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}

/// Owner-or-admin rule shared by every mutating endpoint.
pub fn can_modify(actor_id: i64, actor_role: &str, owner_id: i64) -> bool {
    actor_id == owner_id || actor_role == ROLE_ADMIN
}
