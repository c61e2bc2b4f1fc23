//! Per-request session: an authenticated principal plus its active tenant.

use uuid::Uuid;

use super::principal::{Principal, Role};
use crate::error::{DomainError, DomainResult};

/// The identity a request runs as. The active tenant is never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    principal: Principal,
    active_tenant: Option<Uuid>,
}

impl Session {
    /// Builds a session, validating the requested active tenant.
    ///
    /// `tenant_exists` reports whether the requested tenant is a live tenant;
    /// it is ignored when no tenant is requested.
    pub fn establish(
        principal: Principal,
        requested_tenant: Option<Uuid>,
        tenant_exists: bool,
    ) -> DomainResult<Self> {
        if !principal.state.is_active() {
            return Err(DomainError::forbidden("principal is disabled"));
        }

        if let Some(tenant_id) = requested_tenant {
            if !principal.role.is_global() && !principal.is_member_of(tenant_id) {
                return Err(DomainError::forbidden(
                    "selected hotel is not assigned to this account",
                ));
            }
            if !tenant_exists {
                return Err(DomainError::forbidden("selected hotel does not exist"));
            }
        }

        Ok(Self {
            principal,
            active_tenant: requested_tenant,
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> Uuid {
        self.principal.id
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn active_tenant(&self) -> Option<Uuid> {
        self.active_tenant
    }
}
