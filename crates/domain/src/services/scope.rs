//! Tenant scope resolution.
//!
//! Every read or write of tenant-owned data goes through a [`TenantScope`]
//! computed here from the request session.

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::Session;

/// The set of tenants a request may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    /// Global role with no active tenant.
    Unrestricted,
    /// An active tenant was selected.
    ExactTenant(Uuid),
    /// Tenant role without an active tenant: any of its tenants.
    TenantSet(Vec<Uuid>),
    /// Nothing is visible; writes are refused.
    NoAccess,
}

/// Computes the effective scope. An active tenant always wins over role breadth,
/// so a global principal drilling into one hotel sees only that hotel.
pub fn resolve(session: &Session) -> TenantScope {
    if let Some(tenant_id) = session.active_tenant() {
        return TenantScope::ExactTenant(tenant_id);
    }

    let principal = session.principal();
    if principal.role.is_global() {
        return TenantScope::Unrestricted;
    }

    if principal.tenant_ids.is_empty() {
        TenantScope::NoAccess
    } else {
        TenantScope::TenantSet(principal.tenant_ids.clone())
    }
}

impl TenantScope {
    pub fn allows(&self, tenant_id: Uuid) -> bool {
        match self {
            TenantScope::Unrestricted => true,
            TenantScope::ExactTenant(id) => *id == tenant_id,
            TenantScope::TenantSet(ids) => ids.contains(&tenant_id),
            TenantScope::NoAccess => false,
        }
    }

    /// Whether any tenant in `tenant_ids` is visible.
    pub fn allows_any(&self, tenant_ids: &[Uuid]) -> bool {
        match self {
            TenantScope::Unrestricted => true,
            _ => tenant_ids.iter().any(|id| self.allows(*id)),
        }
    }

    /// Tenant ids to filter by; `None` means no filter.
    pub fn tenant_ids(&self) -> Option<Vec<Uuid>> {
        match self {
            TenantScope::Unrestricted => None,
            TenantScope::ExactTenant(id) => Some(vec![*id]),
            TenantScope::TenantSet(ids) => Some(ids.clone()),
            TenantScope::NoAccess => Some(Vec::new()),
        }
    }

    /// The tenant when exactly one is in scope.
    pub fn single_tenant(&self) -> Option<Uuid> {
        match self {
            TenantScope::ExactTenant(id) => Some(*id),
            TenantScope::TenantSet(ids) if ids.len() == 1 => Some(ids[0]),
            _ => None,
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, TenantScope::Unrestricted)
    }

    /// Picks the tenant a new record belongs to.
    ///
    /// An explicit tenant must be inside the scope; otherwise the scope must
    /// pin down exactly one tenant.
    pub fn target_tenant(&self, requested: Option<Uuid>) -> DomainResult<Uuid> {
        if matches!(self, TenantScope::NoAccess) {
            return Err(DomainError::forbidden("no hotel is accessible"));
        }
        match requested {
            Some(tenant_id) if self.allows(tenant_id) => Ok(tenant_id),
            Some(_) => Err(DomainError::forbidden("hotel is outside the current scope")),
            None => self.single_tenant().ok_or_else(|| {
                DomainError::validation("tenantId is required when several hotels are in scope")
            }),
        }
    }
}
