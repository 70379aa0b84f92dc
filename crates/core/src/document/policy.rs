//! Role/audience access rules.

use super::error::DocumentError;
use super::types::{Audience, Role};

/// Whether `role` may read a document published to `audience`.
///
/// Admins read everything; other roles read documents addressed to their own
/// role or to `both`.
#[must_use]
pub fn can_access(role: Role, audience: Audience) -> bool {
    match role {
        Role::Admin => true,
        _ => audience == Audience::Both || audience == Audience::from(role),
    }
}

/// Audiences a role may list, or `None` when no restriction applies.
#[must_use]
pub fn visible_audiences(role: Role) -> Option<Vec<Audience>> {
    match role {
        Role::Admin => None,
        _ => Some(vec![Audience::from(role), Audience::Both]),
    }
}

/// Reject non-admin callers of mutating operations.
pub fn require_admin(role: Role) -> Result<(), DocumentError> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(DocumentError::forbidden("admin only"))
    }
}
