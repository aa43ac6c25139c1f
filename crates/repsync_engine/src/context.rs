//! Caller identity.

use repsync_protocol::{TenantId, UserId};

/// Identity and tenant scope of the caller of a push request.
///
/// Produced by the tenant/access resolver at the server edge; the
/// engine treats it as ground truth and checks every operation's
/// claimed tenant against it before touching storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// The authenticated user.
    pub user_id: UserId,
    /// The caller's active tenant.
    pub tenant_id: TenantId,
}

impl CallerContext {
    /// Creates a caller context.
    pub fn new(user_id: UserId, tenant_id: TenantId) -> Self {
        Self { user_id, tenant_id }
    }
}
