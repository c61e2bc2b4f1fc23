//! Device management. Disposal bookkeeping is delegated to [`super::lifecycle`]
//! and runs inside the store's row lock.

use chrono::Utc;
use shared::pagination::PageRequest;
use uuid::Uuid;
use validator::Validate;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::found;
use super::lifecycle::{apply_update, create_device};
use super::scope::{self, TenantScope};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    Action, CatalogKind, CreateDeviceRequest, Device, DeviceFilter, DisposedStatuses, Page,
    ResourceKind, Session, UpdateDeviceRequest,
};
use crate::store::Stores;

/// Loads the status entries that currently mean "disposed".
pub(crate) async fn disposed_statuses(stores: &Stores) -> DomainResult<DisposedStatuses> {
    let statuses = stores.catalogs.list(CatalogKind::DeviceStatus).await?;
    Ok(DisposedStatuses::from_entries(&statuses))
}

/// Foreign keys a device write may set.
#[derive(Default)]
struct References {
    type_id: Option<Uuid>,
    status_id: Option<Uuid>,
    os_id: Option<Uuid>,
    area_id: Option<Uuid>,
    assigned_user_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct DeviceService {
    stores: Stores,
    audit: AuditRecorder,
}

impl DeviceService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    /// Catalog entries must exist; area and assignee must be live records of the device's hotel.
    async fn check_references(
        &self,
        scope: &TenantScope,
        tenant_id: Uuid,
        refs: References,
    ) -> DomainResult<()> {
        let catalogs = [
            (CatalogKind::DeviceType, refs.type_id),
            (CatalogKind::DeviceStatus, refs.status_id),
            (CatalogKind::OperatingSystem, refs.os_id),
        ];
        for (kind, id) in catalogs {
            if let Some(id) = id {
                if self.stores.catalogs.find(kind, id).await?.is_none() {
                    return Err(DomainError::validation(format!("unknown {} entry {}", kind, id)));
                }
            }
        }

        if let Some(area_id) = refs.area_id {
            match self.stores.areas.find(scope, area_id).await? {
                Some(area) if area.tenant_id == tenant_id => {}
                _ => return Err(DomainError::validation("area does not exist in this hotel")),
            }
        }
        if let Some(staff_id) = refs.assigned_user_id {
            match self.stores.staff.find(scope, staff_id).await? {
                Some(staff) if staff.tenant_id == tenant_id => {}
                _ => return Err(DomainError::validation("assigned user does not exist in this hotel")),
            }
        }
        Ok(())
    }

    pub async fn list(
        &self,
        session: &Session,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Device>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Device, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.devices.list(&scope, filter, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Device> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Device, None)?;
        found(self.stores.devices.find(&scope, id).await?, "Device")
    }

    pub async fn create(&self, session: &Session, request: CreateDeviceRequest) -> DomainResult<Device> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Device, None)?;
        let tenant_id = scope.target_tenant(request.tenant_id)?;
        if !self.stores.tenants.exists(tenant_id).await? {
            return Err(DomainError::validation("hotel does not exist"));
        }

        let refs = References {
            type_id: request.type_id,
            status_id: request.status_id,
            os_id: request.os_id,
            area_id: request.area_id,
            assigned_user_id: request.assigned_user_id,
        };
        self.check_references(&scope, tenant_id, refs).await?;

        let disposed = disposed_statuses(&self.stores).await?;
        let device = create_device(tenant_id, request, &disposed, Utc::now())?;
        self.stores.devices.insert(&device).await?;

        tracing::info!(device_id = %device.id, tenant_id = %tenant_id, "Device created");
        self.audit
            .record(
                AuditEvent::created(ResourceKind::Device, device.id, &device),
                Some(session),
            )
            .await;
        Ok(device)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateDeviceRequest,
    ) -> DomainResult<Device> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Device, None)?;

        let current = found(self.stores.devices.find(&scope, id).await?, "Device")?;
        let refs = References {
            type_id: request.type_id.flatten(),
            status_id: request.status_id.flatten(),
            os_id: request.os_id.flatten(),
            area_id: request.area_id.flatten(),
            assigned_user_id: request.assigned_user_id.flatten(),
        };
        self.check_references(&scope, current.tenant_id, refs).await?;

        let disposed = disposed_statuses(&self.stores).await?;
        let now = Utc::now();
        let (before, device) = self
            .stores
            .devices
            .update_with(&scope, id, &|prior: &Device| {
                apply_update(prior, &request, &disposed, now)
            })
            .await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Device, id, &before, &device),
                Some(session),
            )
            .await;
        Ok(device)
    }

    /// Soft-deletes the device. Its serial stays reserved for a later import to revive it.
    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Device, None)?;

        let before = found(self.stores.devices.find(&scope, id).await?, "Device")?;
        self.stores.devices.soft_delete(&scope, id, Utc::now()).await?;

        tracing::info!(device_id = %id, "Device deleted");
        self.audit
            .record(AuditEvent::deleted(ResourceKind::Device, id, &before), Some(session))
            .await;
        Ok(())
    }
}
