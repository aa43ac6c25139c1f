//! Tenant context resolution.

use parking_lot::RwLock;
use repsync_protocol::{TenantId, UserId};
use std::collections::HashMap;

/// Resolved tenant scope for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// The caller's active tenant.
    pub tenant_id: TenantId,
}

impl TenantContext {
    /// Creates a tenant context.
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }
}

/// Resolves the active tenant for an authenticated user.
///
/// This is the seam to the platform's membership/permission system.
/// Returning `None` means the user has no active tenant, which the
/// endpoint reports as "Tenant context required".
pub trait TenantDirectory: Send + Sync {
    /// Resolves the caller's tenant context.
    fn resolve(&self, user: &UserId) -> Option<TenantContext>;
}

/// An in-memory [`TenantDirectory`].
pub struct StaticTenantDirectory {
    memberships: RwLock<HashMap<UserId, TenantId>>,
}

impl StaticTenantDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            memberships: RwLock::new(HashMap::new()),
        }
    }

    /// Assigns a user to a tenant, replacing any previous assignment.
    pub fn assign(&self, user: UserId, tenant: TenantId) {
        self.memberships.write().insert(user, tenant);
    }
}

impl Default for StaticTenantDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantDirectory for StaticTenantDirectory {
    fn resolve(&self, user: &UserId) -> Option<TenantContext> {
        self.memberships
            .read()
            .get(user)
            .cloned()
            .map(TenantContext::new)
    }
}
