//! Global catalogs shared by every hotel.

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::scope;
use crate::error::DomainResult;
use crate::models::{Action, CatalogEntry, CatalogKind, CatalogNameRequest, ResourceKind, Session};
use crate::store::Stores;

#[derive(Clone)]
pub struct CatalogService {
    stores: Stores,
    audit: AuditRecorder,
}

impl CatalogService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    pub async fn list(&self, session: &Session, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Catalog, None)?;
        self.stores.catalogs.list(kind).await
    }

    pub async fn create(
        &self,
        session: &Session,
        kind: CatalogKind,
        request: CatalogNameRequest,
    ) -> DomainResult<CatalogEntry> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Catalog, None)?;

        let entry = CatalogEntry::new(kind, &request.name, Utc::now());
        self.stores.catalogs.insert(&entry).await?;

        tracing::info!(catalog = %kind, entry_id = %entry.id, name = %entry.name, "Catalog entry created");
        self.audit
            .record(
                AuditEvent::created(ResourceKind::Catalog, entry.id, &entry),
                Some(session),
            )
            .await;
        Ok(entry)
    }

    pub async fn rename(
        &self,
        session: &Session,
        kind: CatalogKind,
        id: Uuid,
        request: CatalogNameRequest,
    ) -> DomainResult<CatalogEntry> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Catalog, None)?;

        let before = found(self.stores.catalogs.find(kind, id).await?, "Catalog entry")?;
        let entry = self.stores.catalogs.rename(kind, id, &request.name).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Catalog, id, &before, &entry),
                Some(session),
            )
            .await;
        Ok(entry)
    }

    /// Fails with `DependencyInUse` while any device references the entry.
    pub async fn delete(&self, session: &Session, kind: CatalogKind, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Catalog, None)?;

        let before = found(self.stores.catalogs.find(kind, id).await?, "Catalog entry")?;
        self.stores.catalogs.delete(kind, id).await?;

        tracing::info!(catalog = %kind, entry_id = %id, "Catalog entry deleted");
        self.audit
            .record(AuditEvent::deleted(ResourceKind::Catalog, id, &before), Some(session))
            .await;
        Ok(())
    }
}
