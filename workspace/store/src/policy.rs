//! Authorization rules for destructive operations.
//!
//! The administrator is the account with the first id ever assigned. Callers
//! only go through these functions, so the convention can later be replaced
//! by a role column without touching call sites.

use model::entities::review;

use crate::UserId;

pub const ADMIN_ID: UserId = 1;

pub fn is_admin(caller: UserId) -> bool {
    caller == ADMIN_ID
}

/// A review may be deleted by its author or by the administrator.
pub fn can_delete_review(review: &review::Model, caller: UserId) -> bool {
    caller == review.user_id || is_admin(caller)
}

/// Only the administrator deletes catalog items.
pub fn can_delete_item(caller: UserId) -> bool {
    is_admin(caller)
}
