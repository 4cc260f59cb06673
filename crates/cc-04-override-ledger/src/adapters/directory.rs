use crate::ports::ApproverDirectory;
use parking_lot::RwLock;
use shared_types::UserId;
use std::collections::HashSet;

/// Fixed set of approvers, loaded from configuration.
#[derive(Debug, Default)]
pub struct StaticApproverDirectory {
    approvers: RwLock<HashSet<UserId>>,
}

impl StaticApproverDirectory {
    pub fn new(approvers: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            approvers: RwLock::new(approvers.into_iter().collect()),
        }
    }

    pub fn grant(&self, user_id: UserId) {
        self.approvers.write().insert(user_id);
    }

    pub fn revoke(&self, user_id: UserId) -> bool {
        self.approvers.write().remove(&user_id)
    }

    pub fn len(&self) -> usize {
        self.approvers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.approvers.read().is_empty()
    }
}

impl ApproverDirectory for StaticApproverDirectory {
    fn is_approver(&self, user_id: UserId) -> bool {
        self.approvers.read().contains(&user_id)
    }
}
