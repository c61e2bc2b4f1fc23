//! Role capabilities and authorization checks.
//!
//! [`can_perform`] is a pure table over (role, action, resource). The other
//! checks combine it with the tenant scope and the protected-principal rule.

use uuid::Uuid;

use super::scope::TenantScope;
use crate::error::{DomainError, DomainResult};
use crate::models::{Action, Principal, ResourceKind, Role, Session, UpdatePrincipalRequest};

/// Whether `role` may perform `action` on resources of kind `resource`, ignoring tenants.
pub fn can_perform(role: Role, action: Action, resource: ResourceKind) -> bool {
    use Action::*;
    use ResourceKind::*;

    match role {
        Role::GlobalRoot => true,
        Role::GlobalViewer => matches!(action, Read | Export),
        Role::TenantAdmin => match resource {
            Tenant => action == Read,
            Catalog => matches!(action, Read | Create),
            AuditLog => matches!(action, Read | Export),
            Principal => matches!(action, Read | Create | Update | Delete),
            _ => true,
        },
        Role::TenantAssistant => match resource {
            Tenant | Catalog => action == Read,
            Principal | AuditLog => false,
            _ => action != Delete,
        },
        Role::TenantGuest => match resource {
            Principal | AuditLog => false,
            _ => action == Read,
        },
    }
}

/// Authorizes an operation for a session.
///
/// Mutations of tenant-owned data additionally require a usable scope and,
/// when the target tenant is known, that it lies inside the scope.
pub fn authorize(
    session: &Session,
    scope: &TenantScope,
    action: Action,
    resource: ResourceKind,
    target_tenant: Option<Uuid>,
) -> DomainResult<()> {
    if !can_perform(session.role(), action, resource) {
        tracing::debug!(
            principal_id = %session.principal_id(),
            role = %session.role(),
            action = %action,
            resource = %resource,
            "Operation denied by role"
        );
        return Err(DomainError::forbidden(format!(
            "role {} cannot {} {}",
            session.role(),
            action,
            resource
        )));
    }

    if action.is_mutation() && resource.is_tenant_scoped() {
        if *scope == TenantScope::NoAccess {
            return Err(DomainError::forbidden("no hotel is accessible"));
        }
        if let Some(tenant_id) = target_tenant {
            if !scope.allows(tenant_id) {
                return Err(DomainError::forbidden("hotel is outside the current scope"));
            }
        }
    }

    Ok(())
}

/// Tenant admins may only manage tenant-role principals whose hotels all lie in scope.
pub fn authorize_principal_assignment(
    session: &Session,
    scope: &TenantScope,
    role: Role,
    tenant_ids: &[Uuid],
) -> DomainResult<()> {
    if session.role() == Role::GlobalRoot {
        return Ok(());
    }

    if role.is_global() || role.priority() > session.role().priority() {
        return Err(DomainError::forbidden(format!(
            "role {} cannot grant role {}",
            session.role(),
            role
        )));
    }

    if !tenant_ids.iter().all(|id| scope.allows(*id)) {
        return Err(DomainError::forbidden("hotel is outside the current scope"));
    }

    Ok(())
}

/// The bootstrap super-administrator can never be deleted or re-roled, by anyone.
pub fn guard_protected_update(
    target: &Principal,
    request: &UpdatePrincipalRequest,
) -> DomainResult<()> {
    if target.protected && request.changes_role_of(target) {
        return Err(DomainError::forbidden(
            "the super-administrator role cannot be changed",
        ));
    }
    if target.protected && request.tenant_ids.as_ref().is_some_and(|ids| !ids.is_empty()) {
        return Err(DomainError::forbidden(
            "the super-administrator cannot be assigned to hotels",
        ));
    }
    Ok(())
}

pub fn guard_protected_delete(target: &Principal) -> DomainResult<()> {
    if target.protected {
        return Err(DomainError::forbidden(
            "the super-administrator cannot be deleted",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordState;
    use chrono::Utc;

    const TENANT_DATA: [ResourceKind; 6] = [
        ResourceKind::Department,
        ResourceKind::Area,
        ResourceKind::StaffUser,
        ResourceKind::Device,
        ResourceKind::Maintenance,
        ResourceKind::Disposal,
    ];

    fn principal(role: Role, tenants: Vec<Uuid>, protected: bool) -> Principal {
        let now = Utc::now();
        Principal {
            id: Uuid::new_v4(),
            username: format!("{}-user", role),
            email: None,
            role,
            tenant_ids: tenants,
            protected,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        }
    }

    fn session(role: Role, tenants: Vec<Uuid>) -> Session {
        Session::establish(principal(role, tenants, false), None, true).unwrap()
    }

    #[test]
    fn test_global_root_can_do_everything() {
        for resource in ResourceKind::all() {
            for action in [Action::Read, Action::Create, Action::Update, Action::Delete] {
                assert!(can_perform(Role::GlobalRoot, action, *resource));
            }
        }
    }

    #[test]
    fn test_global_viewer_is_read_only() {
        for resource in ResourceKind::all() {
            assert!(can_perform(Role::GlobalViewer, Action::Read, *resource));
            assert!(!can_perform(Role::GlobalViewer, Action::Create, *resource));
            assert!(!can_perform(Role::GlobalViewer, Action::Update, *resource));
            assert!(!can_perform(Role::GlobalViewer, Action::Delete, *resource));
        }
    }

    #[test]
    fn test_tenant_admin_capabilities() {
        for resource in TENANT_DATA {
            assert!(can_perform(Role::TenantAdmin, Action::Create, resource));
            assert!(can_perform(Role::TenantAdmin, Action::Delete, resource));
        }
        assert!(!can_perform(Role::TenantAdmin, Action::Delete, ResourceKind::Tenant));
        assert!(!can_perform(Role::TenantAdmin, Action::Create, ResourceKind::Tenant));
        assert!(can_perform(Role::TenantAdmin, Action::Create, ResourceKind::Catalog));
        assert!(!can_perform(Role::TenantAdmin, Action::Delete, ResourceKind::Catalog));
        assert!(can_perform(Role::TenantAdmin, Action::Update, ResourceKind::Principal));
    }

    #[test]
    fn test_tenant_assistant_cannot_delete() {
        for resource in TENANT_DATA {
            assert!(can_perform(Role::TenantAssistant, Action::Create, resource));
            assert!(can_perform(Role::TenantAssistant, Action::Update, resource));
            assert!(!can_perform(Role::TenantAssistant, Action::Delete, resource));
        }
        assert!(can_perform(Role::TenantAssistant, Action::Import, ResourceKind::Device));
        assert!(!can_perform(Role::TenantAssistant, Action::Read, ResourceKind::AuditLog));
        assert!(!can_perform(Role::TenantAssistant, Action::Create, ResourceKind::Principal));
    }

    #[test]
    fn test_tenant_guest_is_read_only() {
        for resource in TENANT_DATA {
            assert!(can_perform(Role::TenantGuest, Action::Read, resource));
            assert!(!can_perform(Role::TenantGuest, Action::Create, resource));
            assert!(!can_perform(Role::TenantGuest, Action::Import, resource));
        }
    }

    #[test]
    fn test_authorize_rejects_write_outside_scope() {
        let a = Uuid::new_v4();
        let s = session(Role::TenantAdmin, vec![a]);
        let scope = TenantScope::TenantSet(vec![a]);

        assert!(authorize(&s, &scope, Action::Create, ResourceKind::Device, Some(a)).is_ok());
        assert!(matches!(
            authorize(&s, &scope, Action::Create, ResourceKind::Device, Some(Uuid::new_v4())),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn test_authorize_rejects_write_without_scope() {
        let s = session(Role::GlobalRoot, vec![]);
        assert!(matches!(
            authorize(&s, &TenantScope::NoAccess, Action::Update, ResourceKind::Area, None),
            Err(DomainError::Forbidden(_))
        ));
        // Reads stay allowed and simply see nothing
        assert!(authorize(&s, &TenantScope::NoAccess, Action::Read, ResourceKind::Area, None).is_ok());
    }

    #[test]
    fn test_principal_assignment_limits_for_tenant_admin() {
        let a = Uuid::new_v4();
        let admin = session(Role::TenantAdmin, vec![a]);
        let scope = TenantScope::TenantSet(vec![a]);

        assert!(authorize_principal_assignment(&admin, &scope, Role::TenantGuest, &[a]).is_ok());
        assert!(authorize_principal_assignment(&admin, &scope, Role::GlobalViewer, &[]).is_err());
        assert!(
            authorize_principal_assignment(&admin, &scope, Role::TenantGuest, &[Uuid::new_v4()])
                .is_err()
        );

        let root = session(Role::GlobalRoot, vec![]);
        assert!(authorize_principal_assignment(
            &root,
            &TenantScope::Unrestricted,
            Role::GlobalViewer,
            &[]
        )
        .is_ok());
    }

    #[test]
    fn test_protected_principal_guards() {
        let root = principal(Role::GlobalRoot, vec![], true);
        let downgrade = UpdatePrincipalRequest {
            role: Some(Role::TenantGuest),
            ..Default::default()
        };
        let email_only = UpdatePrincipalRequest {
            email: Some(Some("root@hotel.test".into())),
            ..Default::default()
        };

        assert!(matches!(
            guard_protected_update(&root, &downgrade),
            Err(DomainError::Forbidden(_))
        ));
        assert!(guard_protected_update(&root, &email_only).is_ok());
        assert!(matches!(
            guard_protected_delete(&root),
            Err(DomainError::Forbidden(_))
        ));

        let regular = principal(Role::TenantGuest, vec![Uuid::new_v4()], false);
        assert!(guard_protected_delete(&regular).is_ok());
    }
}
