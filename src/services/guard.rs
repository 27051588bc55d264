//! Request-time authorization checks, composable as preconditions on any
//! privileged operation. The actor is always passed explicitly; nothing
//! here reads ambient request state.

use super::admin::AdminError;
use crate::accounts::Account;
use crate::college;
use crate::roles::Role;

/// Require the actor's role level to be at least `minimum`'s level.
pub fn require_min_role(actor: &Account, minimum: Role) -> Result<(), AdminError> {
    if actor.role.meets(minimum) {
        Ok(())
    } else {
        Err(AdminError::InsufficientLevel { minimum })
    }
}

/// Require the actor to share a college with `target_college`.
///
/// `main_admin` has global scope and always passes. Everyone else needs
/// both college ids present and equal (case-insensitive).
pub fn require_same_college(
    actor: &Account,
    target_college: Option<&str>,
) -> Result<(), AdminError> {
    if actor.role == Role::MainAdmin {
        return Ok(());
    }
    if college::same_college(actor.college_id.as_deref(), target_college) {
        Ok(())
    } else {
        Err(AdminError::CrossCollege)
    }
}
