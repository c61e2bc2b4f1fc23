//! Storage ports.
//!
//! Every read and write of tenant-owned data takes a [`TenantScope`]; rows
//! outside the scope behave exactly like missing rows. The only unscoped reads
//! are the ones a background job or an import run needs for a single tenant it
//! has already been authorized for.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::pagination::PageRequest;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::{
    Area, AreaWithDepartment, AuditLog, AuditLogFilter, CatalogEntry, CatalogKind, Department,
    Device, DeviceFilter, Disposal, Maintenance, MaintenanceFilter, MaintenanceReminder, Page,
    Principal, PrincipalCredentials, StaffUser, Tenant,
};
use crate::services::scope::TenantScope;

/// Computes the new device record from the locked prior record.
pub type DeviceUpdate<'a> = &'a (dyn Fn(&Device) -> DomainResult<Device> + Send + Sync);

/// Computes the device record for an import row; receives the matched row, if any.
pub type DeviceUpsert<'a> = &'a (dyn Fn(Option<&Device>) -> DomainResult<Device> + Send + Sync);

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn insert(&self, tenant: &Tenant) -> DomainResult<()>;

    async fn update(&self, tenant: &Tenant) -> DomainResult<()>;

    /// Fails with `DependencyInUse` while live departments, staff or devices remain.
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Tenant>>;

    /// Whether a live tenant with this id exists. Used to validate the active tenant.
    async fn exists(&self, id: Uuid) -> DomainResult<bool>;

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Tenant>>;
}

#[async_trait]
pub trait PrincipalStore: Send + Sync {
    async fn insert(&self, principal: &Principal, password_hash: &str) -> DomainResult<()>;

    /// Replaces the stored password hash only when one is given.
    async fn update(&self, principal: &Principal, password_hash: Option<&str>) -> DomainResult<()>;

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, id: Uuid) -> DomainResult<Option<Principal>>;

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Principal>>;

    async fn find_credentials(&self, username: &str) -> DomainResult<Option<PrincipalCredentials>>;

    /// Unrestricted scopes see every principal; others see principals sharing a tenant.
    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Principal>>;

    /// Live tenant admins of `tenant_id` that have an email address.
    async fn list_notification_recipients(&self, tenant_id: Uuid) -> DomainResult<Vec<Principal>>;
}

#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn insert(&self, department: &Department) -> DomainResult<()>;

    async fn update(&self, scope: &TenantScope, department: &Department) -> DomainResult<()>;

    /// Fails with `DependencyInUse` while live areas remain.
    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Department>>;

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Department>>;
}

#[async_trait]
pub trait AreaStore: Send + Sync {
    async fn insert(&self, area: &Area) -> DomainResult<()>;

    async fn update(&self, scope: &TenantScope, area: &Area) -> DomainResult<()>;

    /// Fails with `DependencyInUse` while live devices remain.
    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Area>>;

    async fn list(
        &self,
        scope: &TenantScope,
        department_id: Option<Uuid>,
        page: PageRequest,
    ) -> DomainResult<Page<Area>>;

    /// Every live area of a tenant joined with its department name.
    async fn list_with_departments(&self, tenant_id: Uuid) -> DomainResult<Vec<AreaWithDepartment>>;
}

#[async_trait]
pub trait StaffUserStore: Send + Sync {
    async fn insert(&self, staff: &StaffUser) -> DomainResult<()>;

    async fn update(&self, scope: &TenantScope, staff: &StaffUser) -> DomainResult<()>;

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<StaffUser>>;

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<StaffUser>>;

    async fn list_all(&self, tenant_id: Uuid) -> DomainResult<Vec<StaffUser>>;
}

/// Global reference catalogs. Entries are unique by `name_key` per kind.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>>;

    async fn find(&self, kind: CatalogKind, id: Uuid) -> DomainResult<Option<CatalogEntry>>;

    /// Fails with `Conflict` when the normalized name already exists.
    async fn insert(&self, entry: &CatalogEntry) -> DomainResult<()>;

    /// Returns the entry with the same normalized name, creating it atomically if absent.
    async fn get_or_create(&self, kind: CatalogKind, name: &str) -> DomainResult<CatalogEntry>;

    async fn rename(&self, kind: CatalogKind, id: Uuid, name: &str) -> DomainResult<CatalogEntry>;

    /// Hard delete. Fails with `DependencyInUse` while any device references the entry.
    async fn delete(&self, kind: CatalogKind, id: Uuid) -> DomainResult<()>;
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    /// Fails with `Conflict` on a duplicate serial or tag within the tenant.
    async fn insert(&self, device: &Device) -> DomainResult<()>;

    /// Locks the row, computes the new record with `apply` and writes it in one
    /// transaction. Returns the prior and the written record.
    async fn update_with(
        &self,
        scope: &TenantScope,
        id: Uuid,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)>;

    /// Locks the row with this serial in the tenant, soft-deleted rows included,
    /// and writes whatever `apply` returns. Returns the matched prior record, if any.
    async fn upsert_by_serial(
        &self,
        tenant_id: Uuid,
        serial: &str,
        apply: DeviceUpsert<'_>,
    ) -> DomainResult<(Option<Device>, Device)>;

    /// Fails with `DependencyInUse` while live maintenances remain.
    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Device>>;

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Device>>;
}

#[async_trait]
pub trait MaintenanceStore: Send + Sync {
    async fn insert(&self, maintenance: &Maintenance) -> DomainResult<()>;

    async fn update(&self, scope: &TenantScope, maintenance: &Maintenance) -> DomainResult<()>;

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Maintenance>>;

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Maintenance>>;

    /// System read for the reminder job: pending live maintenances scheduled
    /// within `[from, until]` on live devices that have not been reminded
    /// about yet, in a single query.
    async fn list_due(&self, from: NaiveDate, until: NaiveDate) -> DomainResult<Vec<MaintenanceReminder>>;

    /// System write for the reminder job.
    async fn mark_reminded(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;
}

#[async_trait]
pub trait DisposalStore: Send + Sync {
    /// Inserts the record and rewrites its locked device with `apply` as one
    /// write; nothing is stored when either half fails. Fails with `Conflict`
    /// when the device already has a disposal record and with `NotFound` when
    /// the device is not live in `scope`. Returns the device before and after.
    async fn insert_with_device(
        &self,
        scope: &TenantScope,
        disposal: &Disposal,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)>;

    async fn update(&self, scope: &TenantScope, disposal: &Disposal) -> DomainResult<()>;

    /// Hard delete.
    async fn delete(&self, scope: &TenantScope, id: Uuid) -> DomainResult<()>;

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Disposal>>;

    async fn find_by_device(&self, scope: &TenantScope, device_id: Uuid) -> DomainResult<Option<Disposal>>;

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Disposal>>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLogStore: Send + Sync {
    async fn insert(&self, entry: &AuditLog) -> DomainResult<()>;

    /// Unrestricted scopes see every entry, others only entries attributed to their tenants.
    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditLogFilter,
        page: PageRequest,
    ) -> DomainResult<Page<AuditLog>>;
}

/// The full set of store ports a service layer runs against.
#[derive(Clone)]
pub struct Stores {
    pub tenants: Arc<dyn TenantStore>,
    pub principals: Arc<dyn PrincipalStore>,
    pub departments: Arc<dyn DepartmentStore>,
    pub areas: Arc<dyn AreaStore>,
    pub staff: Arc<dyn StaffUserStore>,
    pub catalogs: Arc<dyn CatalogStore>,
    pub devices: Arc<dyn DeviceStore>,
    pub maintenances: Arc<dyn MaintenanceStore>,
    pub disposals: Arc<dyn DisposalStore>,
    pub audit_logs: Arc<dyn AuditLogStore>,
}

impl Stores {
    /// Every port backed by one shared [`memory::MemoryStore`].
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(memory::MemoryStore::new()))
    }

    pub fn from_memory(store: Arc<memory::MemoryStore>) -> Self {
        Self {
            tenants: store.clone(),
            principals: store.clone(),
            departments: store.clone(),
            areas: store.clone(),
            staff: store.clone(),
            catalogs: store.clone(),
            devices: store.clone(),
            maintenances: store.clone(),
            disposals: store.clone(),
            audit_logs: store,
        }
    }
}
