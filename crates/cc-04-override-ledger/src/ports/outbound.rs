//! Outbound port to the user and role subsystem.

use shared_types::UserId;
use std::sync::Arc;

/// Answers whether a user may approve rule overrides.
pub trait ApproverDirectory: Send + Sync {
    fn is_approver(&self, user_id: UserId) -> bool;
}

impl<T: ApproverDirectory + ?Sized> ApproverDirectory for Arc<T> {
    fn is_approver(&self, user_id: UserId) -> bool {
        (**self).is_approver(user_id)
    }
}
