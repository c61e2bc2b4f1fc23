//! Preventive and corrective maintenance records.

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
    Action, CreateMaintenanceRequest, Maintenance, MaintenanceFilter, Page, ResourceKind, Session,
    UpdateMaintenanceRequest,
};
use crate::store::Stores;

#[derive(Clone)]
pub struct MaintenanceService {
    stores: Stores,
    audit: AuditRecorder,
}

impl MaintenanceService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self { stores, audit }
    }

    pub async fn list(
        &self,
        session: &Session,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Maintenance>> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Maintenance, None)?;
        if scope == TenantScope::NoAccess {
            return Ok(Page::empty(page));
        }
        self.stores.maintenances.list(&scope, filter, page).await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> DomainResult<Maintenance> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Read, ResourceKind::Maintenance, None)?;
        found(self.stores.maintenances.find(&scope, id).await?, "Maintenance")
    }

    /// The maintenance belongs to the hotel of its device.
    pub async fn create(
        &self,
        session: &Session,
        request: CreateMaintenanceRequest,
    ) -> DomainResult<Maintenance> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Create, ResourceKind::Maintenance, None)?;

        let device = found(self.stores.devices.find(&scope, request.device_id).await?, "Device")?;
        let maintenance = Maintenance::new(device.tenant_id, request, Utc::now());
        self.stores.maintenances.insert(&maintenance).await?;

        self.audit
            .record(
                AuditEvent::created(ResourceKind::Maintenance, maintenance.id, &maintenance),
                Some(session),
            )
            .await;
        Ok(maintenance)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateMaintenanceRequest,
    ) -> DomainResult<Maintenance> {
        request.validate()?;
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Update, ResourceKind::Maintenance, None)?;

        let before = found(self.stores.maintenances.find(&scope, id).await?, "Maintenance")?;
        let mut maintenance = before.clone();
        maintenance.apply(request, Utc::now());
        self.stores.maintenances.update(&scope, &maintenance).await?;

        self.audit
            .record(
                AuditEvent::updated(ResourceKind::Maintenance, id, &before, &maintenance),
                Some(session),
            )
            .await;
        Ok(maintenance)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> DomainResult<()> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Delete, ResourceKind::Maintenance, None)?;

        let before = found(self.stores.maintenances.find(&scope, id).await?, "Maintenance")?;
        self.stores.maintenances.soft_delete(&scope, id, Utc::now()).await?;

        self.audit
            .record(AuditEvent::deleted(ResourceKind::Maintenance, id, &before), Some(session))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use crate::models::{CreateDeviceRequest, Device, MaintenanceKind, MaintenanceStatus, Role};
    use crate::services::testing::{session_in, World};
    use chrono::NaiveDate;

    async fn device(world: &World, session: &Session) -> Device {
        world
            .services
            .devices
            .create(
                session,
                CreateDeviceRequest {
                    name: "Servidor PMS".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
    }

    fn request(device_id: Uuid) -> CreateMaintenanceRequest {
        CreateMaintenanceRequest {
            device_id,
            description: "Cambio de disco".into(),
            kind: MaintenanceKind::Corrective,
            status: None,
            scheduled_date: NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
            completed_date: None,
            technician: Some("Carlos".into()),
        }
    }

    #[tokio::test]
    async fn test_maintenance_inherits_device_tenant() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let admin = session_in(Role::TenantAdmin, vec![a.id], a.id);
        let device = device(&world, &admin).await;

        let maintenance = world
            .services
            .maintenances
            .create(&admin, request(device.id))
            .await
            .unwrap();
        assert_eq!(maintenance.tenant_id, a.id);
        assert_eq!(maintenance.status, MaintenanceStatus::Pending);
    }

    #[tokio::test]
    async fn test_device_of_other_hotel_not_found() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let b = world.tenant("B01").await;
        let admin_a = session_in(Role::TenantAdmin, vec![a.id], a.id);
        let admin_b = session_in(Role::TenantAdmin, vec![b.id], b.id);
        let device = device(&world, &admin_a).await;

        assert!(matches!(
            world.services.maintenances.create(&admin_b, request(device.id)).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_completion_stamps_date() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let admin = session_in(Role::TenantAdmin, vec![a.id], a.id);
        let device = device(&world, &admin).await;
        let maintenances = &world.services.maintenances;

        let created = maintenances.create(&admin, request(device.id)).await.unwrap();
        let completed = maintenances
            .update(
                &admin,
                created.id,
                UpdateMaintenanceRequest {
                    status: Some(MaintenanceStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(completed.completed_date.is_some());
    }

    #[tokio::test]
    async fn test_device_delete_blocked_by_live_maintenance() {
        let world = World::new();
        let a = world.tenant("A01").await;
        let admin = session_in(Role::TenantAdmin, vec![a.id], a.id);
        let device = device(&world, &admin).await;
        let maintenance = world
            .services
            .maintenances
            .create(&admin, request(device.id))
            .await
            .unwrap();

        assert!(matches!(
            world.services.devices.delete(&admin, device.id).await,
            Err(DomainError::DependencyInUse(_))
        ));

        world
            .services
            .maintenances
            .delete(&admin, maintenance.id)
            .await
            .unwrap();
        assert!(world.services.devices.delete(&admin, device.id).await.is_ok());
    }
}
