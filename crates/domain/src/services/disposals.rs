//! Formal disposal records ("actas de baja").
//!
//! Recording a disposal also moves the device to the disposed status when the
//! catalog has one. Deleting the record leaves the device untouched.

use chrono::{NaiveTime, Utc};
use shared::pagination::PageRequest;
use uuid::Uuid;
use validator::Validate;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::lifecycle::apply_update;
use super::scope::{self, TenantScope};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    Action, CatalogEntry, CatalogKind, CreateDisposalRequest, Device, Disposal, DisposedStatuses,
    Page, ResourceKind, Session, UpdateDeviceRequest, UpdateDisposalRequest,
};
use crate::store::Stores;

/// Device changes that move it to the disposed status, copying date and
/// reason. `None` when the catalog has no disposed status.
fn disposal_changes(statuses: &[CatalogEntry], disposal: &Disposal) -> Option<UpdateDeviceRequest> {
    let Some(status) = statuses.iter().find(|s| s.is_disposed_status()) else {
        tracing::debug!(device_id = %disposal.device_id, "No disposed status in catalog, device status unchanged");
        return None;
    };
    Some(UpdateDeviceRequest {
        status_id: Some(Some(status.id)),
        disposal_date: Some(Some(disposal.disposal_date.and_time(NaiveTime::MIN).and_utc())),
        disposal_reason: Some(Some(disposal.reason.clone())),
        disposal_notes: Some(disposal.notes.clone()),
        ..Default::default()
    })
}

#[derive(Clone)]
pub struct DisposalService {
    stores: Stores,
    audit: AuditRecorder,
}

impl DisposalService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    pub async fn list(&self, session: &Session, page: PageRequest) -> DomainResult<Page<Disposal>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Disposal, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.disposals.list(&scope, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Disposal> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Disposal, None)?;
        found(self.stores.disposals.find(&scope, id).await?, "Disposal")
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreateDisposalRequest,
    ) -> DomainResult<Disposal> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Disposal, None)?;

        let device = found(self.stores.devices.find(&scope, request.device_id).await?, "Device")?;
        if self
            .stores
            .disposals
            .find_by_device(&scope, device.id)
            .await?
            .is_some()
        {
            return Err(DomainError::business_rule(format!(
                "device {} already has a disposal record",
                device.label()
            )));
        }

        let disposal = Disposal::new(
            device.tenant_id,
            request,
            Some(session.principal_id()),
            Utc::now(),
        );
        let statuses = self.stores.catalogs.list(CatalogKind::DeviceStatus).await?;
        let disposed = DisposedStatuses::from_entries(&statuses);
        let changes = disposal_changes(&statuses, &disposal);
        let now = Utc::now();

        let written = self
            .stores
            .disposals
            .insert_with_device(&scope, &disposal, &|prior: &Device| -> DomainResult<Device> {
                match &changes {
                    Some(changes) if !disposed.contains(prior.status_id) => {
                        apply_update(prior, changes, &disposed, now)
                    }
                    _ => Ok(prior.clone()),
                }
            })
            .await;
        let (before, after) = match written {
            Ok(pair) => pair,
            Err(DomainError::Conflict(_)) => {
                return Err(DomainError::business_rule(format!(
                    "device {} already has a disposal record",
                    device.label()
                )))
            }
            Err(e) => return Err(e),
        };

        tracing::info!(disposal_id = %disposal.id, device_id = %device.id, "Disposal recorded");
        self.audit
            .record(
                AuditEvent::created(ResourceKind::Disposal, disposal.id, &disposal),
                Some(session),
            )
            .await;
        if before != after {
            self.audit
                .record(
                    AuditEvent::updated(ResourceKind::Device, device.id, &before, &after)
                        .with_detail(format!("disposal {}", disposal.id)),
                    Some(session),
                )
                .await;
        }
        Ok(disposal)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateDisposalRequest,
    ) -> DomainResult<Disposal> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Disposal, None)?;

        let before = found(self.stores.disposals.find(&scope, id).await?, "Disposal")?;
        let mut disposal = before.clone();
        disposal.apply(request, Utc::now());
        self.stores.disposals.update(&scope, &disposal).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Disposal, id, &before, &disposal),
                Some(session),
            )
            .await;
        Ok(disposal)
    }

    /// Removes the record for good.
    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Disposal, None)?;

        let before = found(self.stores.disposals.find(&scope, id).await?, "Disposal")?;
        self.stores.disposals.delete(&scope, id).await?;

        tracing::info!(disposal_id = %id, "Disposal deleted");
        self.audit
            .record(AuditEvent::deleted(ResourceKind::Disposal, id, &before), Some(session))
            .await;
        Ok(())
    }
}
