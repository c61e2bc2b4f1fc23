//! System login principals: authentication, session establishment and management.

use chrono::Utc;
use shared::pagination::PageRequest;
use shared::password::{hash_password, verify_password};
use uuid::Uuid;
use validator::Validate;

use super::access_policy::{
    authorize, authorize_principal_assignment, guard_protected_delete, guard_protected_update,
};
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::scope::{self, TenantScope};
use crate::error::{DomainError, DomainResult};
use crate::models::principal::dedup_tenants;
use crate::models::{
    Action, AuditAction, CreatePrincipalRequest, Page, Principal, RecordState, ResourceKind, Role,
    Session, UpdatePrincipalRequest,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct PrincipalService {
    stores: Stores,
    audit: AuditRecorder,
}

fn hash(password: &str) -> DomainResult<String> {
    hash_password(password).map_err(|e| DomainError::Internal(e.to_string()))
}

impl PrincipalService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    /// Checks credentials. `Ok(None)` means the username or password is wrong.
    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<Option<Principal>> {
        let credentials = self.stores.principals.find_credentials(username.trim()).await?;

        let verified = match &credentials {
            Some(c) => verify_password(password, &c.password_hash).unwrap_or_else(|e| {
                tracing::error!(principal_id = %c.principal.id, error = %e, "Stored password hash is unreadable");
                false
            }),
            None => false,
        };

        match credentials {
            Some(c) if verified => {
                tracing::info!(principal_id = %c.principal.id, "Login succeeded");
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::Login, ResourceKind::Principal)
                            .on(c.principal.id)
                            .by(c.principal.id),
                        None,
                    )
                    .await;
                Ok(Some(c.principal))
            }
            _ => {
                tracing::warn!(username = %username, "Login failed");
                self.audit
                    .record(
                        AuditEvent::new(AuditAction::LoginFailed, ResourceKind::Principal)
                            .with_detail(format!("username: {}", username.trim())),
                        None,
                    )
                    .await;
                Ok(None)
            }
        }
    }

    /// Builds the request session for an authenticated principal.
    pub async fn establish_session(
        &self,
        principal_id: Uuid,
        requested_tenant: Option<Uuid>,
    ) -> DomainResult<Session> {
        let principal = found(self.stores.principals.find(principal_id).await?, "Principal")?;
        let tenant_exists = match requested_tenant {
            Some(tenant_id) => self.stores.tenants.exists(tenant_id).await?,
            None => false,
        };

        let result = Session::establish(principal, requested_tenant, tenant_exists);
        if let Err(DomainError::Forbidden(reason)) = &result {
            self.audit
                .record(
                    AuditEvent::new(AuditAction::UnauthorizedAccess, ResourceKind::Tenant)
                        .by(principal_id)
                        .with_detail(reason.clone()),
                    None,
                )
                .await;
        }
        result
    }

    fn visible(scope: &TenantScope, session: &Session, principal: &Principal) -> bool {
        principal.id == session.principal_id()
            || scope.is_unrestricted()
            || scope.allows_any(&principal.tenant_ids)
    }

    pub async fn list(&self, session: &Session, page: PageRequest) -> DomainResult<Page<Principal>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Principal, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.principals.list(&scope, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Principal> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Principal, None)?;
        let principal = found(self.stores.principals.find(id).await?, "Principal")?;
        if !Self::visible(&scope, session, &principal) {
            return Err(DomainError::not_found("Principal"));
        }
        Ok(principal)
    }

    async fn check_tenants_exist(&self, tenant_ids: &[Uuid]) -> DomainResult<()> {
        for tenant_id in tenant_ids {
            if !self.stores.tenants.exists(*tenant_id).await? {
                return Err(DomainError::validation(format!("hotel {} does not exist", tenant_id)));
            }
        }
        Ok(())
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreatePrincipalRequest,
    ) -> DomainResult<Principal> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Principal, None)?;

        let tenant_ids = dedup_tenants(request.tenant_ids);
        request.role.check_tenant_assignment(&tenant_ids)?;
        authorize_principal_assignment(session, &scope, request.role, &tenant_ids)?;
        self.check_tenants_exist(&tenant_ids).await?;

        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            username: request.username.trim().to_string(),
            email: request.email,
            role: request.role,
            tenant_ids,
            protected: false,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        };
        self.stores
            .principals
            .insert(&principal, &hash(&request.password)?)
            .await?;

        tracing::info!(principal_id = %principal.id, role = %principal.role, "Principal created");
        self.audit
            .record(
                AuditEvent::created(ResourceKind::Principal, principal.id, &principal),
                Some(session),
            )
            .await;
        Ok(principal)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdatePrincipalRequest,
    ) -> DomainResult<Principal> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Principal, None)?;

        let before = found(self.stores.principals.find(id).await?, "Principal")?;
        guard_protected_update(&before, &request)?;
        if !Self::visible(&scope, session, &before) {
            return Err(DomainError::not_found("Principal"));
        }
        authorize_principal_assignment(session, &scope, before.role, &before.tenant_ids)?;

        let UpdatePrincipalRequest {
            email,
            password,
            role,
            tenant_ids,
        } = request;

        let mut principal = before.clone();
        if let Some(email) = email {
            principal.email = email;
        }
        if let Some(role) = role {
            principal.role = role;
        }
        match tenant_ids {
            Some(tenant_ids) => principal.tenant_ids = dedup_tenants(tenant_ids),
            // Promotion to a global role drops the old hotel assignment
            None if principal.role.is_global() => principal.tenant_ids.clear(),
            None => {}
        }
        principal.role.check_tenant_assignment(&principal.tenant_ids)?;
        authorize_principal_assignment(session, &scope, principal.role, &principal.tenant_ids)?;
        self.check_tenants_exist(&principal.tenant_ids).await?;
        principal.updated_at = Utc::now();

        let password_hash = password.as_deref().map(hash).transpose()?;
        self.stores
            .principals
            .update(&principal, password_hash.as_deref())
            .await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Principal, id, &before, &principal),
                Some(session),
            )
            .await;
        Ok(principal)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Principal, None)?;

        let before = found(self.stores.principals.find(id).await?, "Principal")?;
        guard_protected_delete(&before)?;
        if !Self::visible(&scope, session, &before) {
            return Err(DomainError::not_found("Principal"));
        }
        authorize_principal_assignment(session, &scope, before.role, &before.tenant_ids)?;

        self.stores.principals.soft_delete(id, Utc::now()).await?;

        tracing::info!(principal_id = %id, "Principal deleted");
        self.audit
            .record(AuditEvent::deleted(ResourceKind::Principal, id, &before), Some(session))
            .await;
        Ok(())
    }

    /// Creates the protected super-administrator unless the username is taken.
    /// Returns `true` when a principal was created.
    pub async fn bootstrap_root(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
    ) -> DomainResult<bool> {
        if self.stores.principals.find_by_username(username).await?.is_some() {
            tracing::debug!(username = %username, "Super-administrator already present");
            return Ok(false);
        }

        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            username: username.trim().to_string(),
            email,
            role: Role::GlobalRoot,
            tenant_ids: Vec::new(),
            protected: true,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        };

        match self.stores.principals.insert(&principal, &hash(password)?).await {
            Ok(()) => {
                tracing::info!(principal_id = %principal.id, username = %principal.username, "Super-administrator created");
                self.audit
                    .record(
                        AuditEvent::created(ResourceKind::Principal, principal.id, &principal)
                            .by(principal.id)
                            .with_detail("bootstrap"),
                        None,
                    )
                    .await;
                Ok(true)
            }
            // Another instance won the race
            Err(DomainError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{session, World};
    use crate::store::PrincipalStore;

    fn create_request(role: Role, tenants: Vec<Uuid>) -> CreatePrincipalRequest {
        CreatePrincipalRequest {
            username: format!("user-{}", &Uuid::new_v4().to_string()[..8]),
            email: None,
            password: "correct horse battery".into(),
            role,
            tenant_ids: tenants,
        }
    }

    async fn root_principal(world: &World) -> Principal {
        world
            .services
            .principals
            .bootstrap_root("admin", "super-secret-password", None)
            .await
            .unwrap();
        PrincipalStore::find_by_username(world.store.as_ref(), "admin")
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_role_tenant_invariant_on_create() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let root = session(Role::GlobalRoot, vec![]);
        let principals = &world.services.principals;

        assert!(matches!(
            principals.create(&root, create_request(Role::TenantGuest, vec![])).await,
            Err(DomainError::BusinessRuleViolation(_))
        ));
        assert!(matches!(
            principals
                .create(&root, create_request(Role::GlobalViewer, vec![a.id]))
                .await,
            Err(DomainError::BusinessRuleViolation(_))
        ));
        assert!(principals
            .create(&root, create_request(Role::TenantGuest, vec![a.id]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_tenant_admin_limited_to_own_tenants() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let admin = session(Role::TenantAdmin, vec![a.id]);
        let principals = &world.services.principals;

        assert!(principals
            .create(&admin, create_request(Role::TenantAssistant, vec![a.id]))
            .await
            .is_ok());
        assert!(matches!(
            principals
                .create(&admin, create_request(Role::TenantAssistant, vec![a.id, b.id]))
                .await,
            Err(DomainError::Forbidden(_))
        ));
        assert!(matches!(
            principals.create(&admin, create_request(Role::GlobalViewer, vec![])).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_protected_principal_cannot_be_changed_by_anyone() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let root_principal = root_principal(&world).await;
        let principals = &world.services.principals;

        let itself = Session::establish(root_principal.clone(), None, false).unwrap();
        let other_root = session(Role::GlobalRoot, vec![]);
        let admin = session(Role::TenantAdmin, vec![a.id]);

        for actor in [&itself, &other_root, &admin] {
            let downgrade = UpdatePrincipalRequest {
                role: Some(Role::GlobalViewer),
                ..Default::default()
            };
            assert!(matches!(
                principals.update(actor, root_principal.id, downgrade).await,
                Err(DomainError::Forbidden(_))
            ));
            assert!(matches!(
                principals.delete(actor, root_principal.id).await,
                Err(DomainError::Forbidden(_))
            ));
        }

        // Non-role changes by the principal itself are allowed
        let email = UpdatePrincipalRequest {
            email: Some(Some("root@hotel.test".into())),
            ..Default::default()
        };
        assert!(principals.update(&itself, root_principal.id, email).await.is_ok());
    }

    #[tokio::test]
    async fn test_promotion_to_global_role_clears_tenants() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let root = session(Role::GlobalRoot, vec![]);
        let principals = &world.services.principals;
        let guest = principals
            .create(&root, create_request(Role::TenantGuest, vec![a.id]))
            .await
            .unwrap();

        let promote = UpdatePrincipalRequest {
            role: Some(Role::GlobalViewer),
            ..Default::default()
        };
        let promoted = principals.update(&root, guest.id, promote).await.unwrap();
        assert_eq!(promoted.role, Role::GlobalViewer);
        assert!(promoted.tenant_ids.is_empty());

        let stored = PrincipalStore::find(world.store.as_ref(), guest.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.tenant_ids.is_empty());
    }

    #[tokio::test]
    async fn test_update_can_clear_email() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let root = session(Role::GlobalRoot, vec![]);
        let principals = &world.services.principals;
        let mut request = create_request(Role::TenantAdmin, vec![a.id]);
        request.email = Some("admin@hotel.test".into());
        let admin = principals.create(&root, request).await.unwrap();
        assert!(admin.email.is_some());

        let untouched = principals
            .update(&root, admin.id, UpdatePrincipalRequest::default())
            .await
            .unwrap();
        assert_eq!(untouched.email.as_deref(), Some("admin@hotel.test"));

        let clear = UpdatePrincipalRequest {
            email: Some(None),
            ..Default::default()
        };
        let cleared = principals.update(&root, admin.id, clear).await.unwrap();
        assert_eq!(cleared.email, None);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let world = World::new();
        let root_principal = root_principal(&world).await;
        let principals = &world.services.principals;

        let ok = principals
            .authenticate("admin", "super-secret-password")
            .await
            .unwrap();
        assert_eq!(ok.map(|p| p.id), Some(root_principal.id));
        assert!(principals.authenticate("admin", "wrong").await.unwrap().is_none());
        assert!(principals.authenticate("nobody", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let world = World::new();
        let principals = &world.services.principals;
        assert!(principals.bootstrap_root("admin", "pw-long-enough", None).await.unwrap());
        assert!(!principals.bootstrap_root("admin", "pw-long-enough", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_establish_session_validates_active_tenant() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let root = session(Role::GlobalRoot, vec![]);
        let guest = world
            .services
            .principals
            .create(&root, create_request(Role::TenantGuest, vec![a.id]))
            .await
            .unwrap();
        let principals = &world.services.principals;

        assert!(principals.establish_session(guest.id, Some(a.id)).await.is_ok());
        assert!(matches!(
            principals.establish_session(guest.id, Some(b.id)).await,
            Err(DomainError::Forbidden(_))
        ));

        let root_principal = root_principal(&world).await;
        assert!(matches!(
            principals
                .establish_session(root_principal.id, Some(Uuid::new_v4()))
                .await,
            Err(DomainError::Forbidden(_))
        ));
    }
}
