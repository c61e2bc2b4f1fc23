//! Hotel management.

use chrono::Utc;
use shared::pagination::PageRequest;
use uuid::Uuid;
use validator::Validate;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::scope::{self, TenantScope};
use crate::error::DomainResult;
use crate::models::{
    Action, CreateTenantRequest, Page, ResourceKind, Session, Tenant, UpdateTenantRequest,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct TenantService {
    stores: Stores,
    audit: AuditRecorder,
}

impl TenantService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    /// Global principals list every hotel; others only the hotels in their scope.
    pub async fn list(&self, session: &Session, page: PageRequest) -> DomainResult<Page<Tenant>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Tenant, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.tenants.list(&scope, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Tenant> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Tenant, None)?;
        found(self.stores.tenants.find(&scope, id).await?, "Hotel")
    }

    pub async fn create(&self, session: &Session, request: CreateTenantRequest) -> DomainResult<Tenant> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Tenant, None)?;

        let tenant = Tenant::new(request, Utc::now());
        self.stores.tenants.insert(&tenant).await?;

        tracing::info!(tenant_id = %tenant.id, code = %tenant.code, "Hotel created");
        self.audit
            .record(
                AuditEvent::created(ResourceKind::Tenant, tenant.id, &tenant),
                Some(session),
            )
            .await;
        Ok(tenant)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateTenantRequest,
    ) -> DomainResult<Tenant> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Tenant, None)?;

        let before = found(self.stores.tenants.find(&scope, id).await?, "Hotel")?;
        let mut tenant = before.clone();
        tenant.apply(request, Utc::now());
        self.stores.tenants.update(&tenant).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Tenant, id, &before, &tenant),
                Some(session),
            )
            .await;
        Ok(tenant)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Tenant, None)?;

        let before = found(self.stores.tenants.find(&scope, id).await?, "Hotel")?;
        self.stores.tenants.soft_delete(id, Utc::now()).await?;

        tracing::info!(tenant_id = %id, "Hotel deleted");
        self.audit
            .record(AuditEvent::deleted(ResourceKind::Tenant, id, &before), Some(session))
            .await;
        Ok(())
    }
}
