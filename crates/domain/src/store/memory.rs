//! In-memory implementation of every store port.
//!
//! Each operation runs under one `tokio::sync::Mutex`, which gives the same
//! read-then-write atomicity the SQL stores get from row locks. Used by tests
//! and for running the API without a database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use shared::pagination::PageRequest;
use shared::text::normalize_key;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    AreaStore, AuditLogStore, CatalogStore, DepartmentStore, DeviceStore, DeviceUpdate,
    DeviceUpsert, DisposalStore, MaintenanceStore, PrincipalStore, StaffUserStore, TenantStore,
};
use crate::error::{DomainError, DomainResult};
use crate::models::{
    Area, AreaWithDepartment, AuditLog, AuditLogFilter, CatalogEntry, CatalogKind, Department,
    Device, DeviceFilter, Disposal, Maintenance, MaintenanceFilter, MaintenanceReminder, Page,
    Principal, PrincipalCredentials, RecordState, Role, StaffUser, Tenant, TenantOwned,
};
use crate::services::scope::TenantScope;

#[derive(Default)]
struct State {
    tenants: Vec<Tenant>,
    principals: Vec<(Principal, String)>,
    departments: Vec<Department>,
    areas: Vec<Area>,
    staff: Vec<StaffUser>,
    catalogs: Vec<CatalogEntry>,
    devices: Vec<Device>,
    maintenances: Vec<Maintenance>,
    disposals: Vec<Disposal>,
    audit_logs: Vec<AuditLog>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn visible<T: TenantOwned>(scope: &TenantScope, item: &T) -> bool {
    item.is_live() && scope.allows(item.tenant_id())
}

fn conflict(message: impl Into<String>) -> DomainError {
    DomainError::Conflict(message.into())
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

/// Replaces the visible record with the same id, or fails with `NotFound`.
fn replace_visible<T: TenantOwned + Clone>(
    rows: &mut [T],
    scope: &TenantScope,
    record: &T,
    entity: &str,
) -> DomainResult<()> {
    let slot = rows
        .iter_mut()
        .find(|r| r.id() == record.id() && visible(scope, &**r))
        .ok_or_else(|| DomainError::not_found(entity))?;
    *slot = record.clone();
    Ok(())
}

fn paged<T: Clone>(rows: impl Iterator<Item = T>, page: PageRequest) -> Page<T> {
    Page::from_vec(rows.collect(), page)
}

impl State {
    fn check_tenant_code(&self, tenant: &Tenant) -> DomainResult<()> {
        let taken = self.tenants.iter().any(|t| {
            t.id != tenant.id && t.state.is_active() && same_text(&t.code, &tenant.code)
        });
        if taken {
            return Err(conflict(format!("hotel code {} already exists", tenant.code)));
        }
        Ok(())
    }

    fn check_department_name(&self, department: &Department) -> DomainResult<()> {
        let taken = self.departments.iter().any(|d| {
            d.id != department.id
                && d.is_live()
                && d.tenant_id == department.tenant_id
                && same_text(&d.name, &department.name)
        });
        if taken {
            return Err(conflict(format!("department {} already exists", department.name)));
        }
        Ok(())
    }

    fn check_area_name(&self, area: &Area) -> DomainResult<()> {
        let taken = self.areas.iter().any(|a| {
            a.id != area.id
                && a.is_live()
                && a.department_id == area.department_id
                && same_text(&a.name, &area.name)
        });
        if taken {
            return Err(conflict(format!("area {} already exists", area.name)));
        }
        Ok(())
    }

    fn check_staff_login(&self, staff: &StaffUser) -> DomainResult<()> {
        let Some(login) = staff.login.as_deref() else {
            return Ok(());
        };
        let taken = self.staff.iter().any(|s| {
            s.id != staff.id
                && s.is_live()
                && s.tenant_id == staff.tenant_id
                && s.login.as_deref().is_some_and(|l| same_text(l, login))
        });
        if taken {
            return Err(conflict(format!("login {} already exists", login)));
        }
        Ok(())
    }

    fn check_device_keys(&self, device: &Device) -> DomainResult<()> {
        for other in self
            .devices
            .iter()
            .filter(|d| d.id != device.id && d.tenant_id == device.tenant_id)
        {
            if device.serial.is_some() && other.serial == device.serial {
                return Err(conflict(format!(
                    "serial {} already exists",
                    device.serial.as_deref().unwrap_or_default()
                )));
            }
            if device.tag.is_some() && other.is_live() && other.tag == device.tag {
                return Err(conflict(format!(
                    "tag {} already exists",
                    device.tag.as_deref().unwrap_or_default()
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TenantStore for MemoryStore {
    async fn insert(&self, tenant: &Tenant) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_tenant_code(tenant)?;
        state.tenants.push(tenant.clone());
        Ok(())
    }

    async fn update(&self, tenant: &Tenant) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_tenant_code(tenant)?;
        let slot = state
            .tenants
            .iter_mut()
            .find(|t| t.id == tenant.id && t.state.is_active())
            .ok_or_else(|| DomainError::not_found("Hotel"))?;
        *slot = tenant.clone();
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let in_use = state.departments.iter().any(|d| d.tenant_id == id && d.is_live())
            || state.staff.iter().any(|s| s.tenant_id == id && s.is_live())
            || state.devices.iter().any(|d| d.tenant_id == id && d.is_live());
        if in_use {
            return Err(DomainError::DependencyInUse(
                "hotel still has departments, staff or devices".into(),
            ));
        }
        let tenant = state
            .tenants
            .iter_mut()
            .find(|t| t.id == id && t.state.is_active())
            .ok_or_else(|| DomainError::not_found("Hotel"))?;
        tenant.state = RecordState::SoftDeleted { at };
        tenant.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Tenant>> {
        let state = self.state.lock().await;
        Ok(state
            .tenants
            .iter()
            .find(|t| t.id == id && t.state.is_active() && scope.allows(t.id))
            .cloned())
    }

    async fn exists(&self, id: Uuid) -> DomainResult<bool> {
        let state = self.state.lock().await;
        Ok(state.tenants.iter().any(|t| t.id == id && t.state.is_active()))
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Tenant>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Tenant> = state
            .tenants
            .iter()
            .filter(|t| t.state.is_active() && scope.allows(t.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_vec(rows, page))
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn insert(&self, principal: &Principal, password_hash: &str) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state
            .principals
            .iter()
            .any(|(p, _)| same_text(&p.username, &principal.username))
        {
            return Err(conflict(format!("username {} already exists", principal.username)));
        }
        state
            .principals
            .push((principal.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn update(&self, principal: &Principal, password_hash: Option<&str>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let (slot, hash) = state
            .principals
            .iter_mut()
            .find(|(p, _)| p.id == principal.id && p.state.is_active())
            .ok_or_else(|| DomainError::not_found("Principal"))?;
        *slot = principal.clone();
        if let Some(new_hash) = password_hash {
            *hash = new_hash.to_string();
        }
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let (principal, _) = state
            .principals
            .iter_mut()
            .find(|(p, _)| p.id == id && p.state.is_active())
            .ok_or_else(|| DomainError::not_found("Principal"))?;
        principal.state = RecordState::SoftDeleted { at };
        principal.updated_at = at;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> DomainResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .iter()
            .map(|(p, _)| p)
            .find(|p| p.id == id && p.state.is_active())
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .iter()
            .map(|(p, _)| p)
            .find(|p| same_text(&p.username, username))
            .cloned())
    }

    async fn find_credentials(&self, username: &str) -> DomainResult<Option<PrincipalCredentials>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .iter()
            .find(|(p, _)| p.state.is_active() && same_text(&p.username, username))
            .map(|(p, hash)| PrincipalCredentials {
                principal: p.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Principal>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Principal> = state
            .principals
            .iter()
            .map(|(p, _)| p)
            .filter(|p| {
                p.state.is_active() && (scope.is_unrestricted() || scope.allows_any(&p.tenant_ids))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(Page::from_vec(rows, page))
    }

    async fn list_notification_recipients(&self, tenant_id: Uuid) -> DomainResult<Vec<Principal>> {
        let state = self.state.lock().await;
        Ok(state
            .principals
            .iter()
            .map(|(p, _)| p)
            .filter(|p| {
                p.state.is_active()
                    && p.role == Role::TenantAdmin
                    && p.is_member_of(tenant_id)
                    && p.email.is_some()
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn insert(&self, department: &Department) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_department_name(department)?;
        state.departments.push(department.clone());
        Ok(())
    }

    async fn update(&self, scope: &TenantScope, department: &Department) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_department_name(department)?;
        replace_visible(&mut state.departments, scope, department, "Department")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state.areas.iter().any(|a| a.department_id == id && a.is_live()) {
            return Err(DomainError::DependencyInUse("department still has areas".into()));
        }
        let department = state
            .departments
            .iter_mut()
            .find(|d| d.id == id && visible(scope, &**d))
            .ok_or_else(|| DomainError::not_found("Department"))?;
        department.state = RecordState::SoftDeleted { at };
        department.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Department>> {
        let state = self.state.lock().await;
        Ok(state
            .departments
            .iter()
            .find(|d| d.id == id && visible(scope, &**d))
            .cloned())
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Department>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Department> = state
            .departments
            .iter()
            .filter(|d| visible(scope, &**d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_vec(rows, page))
    }
}

#[async_trait]
impl AreaStore for MemoryStore {
    async fn insert(&self, area: &Area) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_area_name(area)?;
        state.areas.push(area.clone());
        Ok(())
    }

    async fn update(&self, scope: &TenantScope, area: &Area) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_area_name(area)?;
        replace_visible(&mut state.areas, scope, area, "Area")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state.devices.iter().any(|d| d.area_id == Some(id) && d.is_live()) {
            return Err(DomainError::DependencyInUse("area still has devices".into()));
        }
        let area = state
            .areas
            .iter_mut()
            .find(|a| a.id == id && visible(scope, &**a))
            .ok_or_else(|| DomainError::not_found("Area"))?;
        area.state = RecordState::SoftDeleted { at };
        area.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Area>> {
        let state = self.state.lock().await;
        Ok(state.areas.iter().find(|a| a.id == id && visible(scope, &**a)).cloned())
    }

    async fn list(
        &self,
        scope: &TenantScope,
        department_id: Option<Uuid>,
        page: PageRequest,
    ) -> DomainResult<Page<Area>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Area> = state
            .areas
            .iter()
            .filter(|a| visible(scope, &**a) && department_id.map_or(true, |d| a.department_id == d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_vec(rows, page))
    }

    async fn list_with_departments(&self, tenant_id: Uuid) -> DomainResult<Vec<AreaWithDepartment>> {
        let state = self.state.lock().await;
        Ok(state
            .areas
            .iter()
            .filter(|a| a.tenant_id == tenant_id && a.is_live())
            .filter_map(|a| {
                state
                    .departments
                    .iter()
                    .find(|d| d.id == a.department_id && d.is_live())
                    .map(|d| AreaWithDepartment {
                        area: a.clone(),
                        department_name: d.name.clone(),
                    })
            })
            .collect())
    }
}

#[async_trait]
impl StaffUserStore for MemoryStore {
    async fn insert(&self, staff: &StaffUser) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_staff_login(staff)?;
        state.staff.push(staff.clone());
        Ok(())
    }

    async fn update(&self, scope: &TenantScope, staff: &StaffUser) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_staff_login(staff)?;
        replace_visible(&mut state.staff, scope, staff, "Staff user")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let staff = state
            .staff
            .iter_mut()
            .find(|s| s.id == id && visible(scope, &**s))
            .ok_or_else(|| DomainError::not_found("Staff user"))?;
        staff.state = RecordState::SoftDeleted { at };
        staff.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<StaffUser>> {
        let state = self.state.lock().await;
        Ok(state.staff.iter().find(|s| s.id == id && visible(scope, &**s)).cloned())
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<StaffUser>> {
        let state = self.state.lock().await;
        let mut rows: Vec<StaffUser> = state
            .staff
            .iter()
            .filter(|s| visible(scope, &**s))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(Page::from_vec(rows, page))
    }

    async fn list_all(&self, tenant_id: Uuid) -> DomainResult<Vec<StaffUser>> {
        let state = self.state.lock().await;
        Ok(state
            .staff
            .iter()
            .filter(|s| s.tenant_id == tenant_id && s.is_live())
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list(&self, kind: CatalogKind) -> DomainResult<Vec<CatalogEntry>> {
        let state = self.state.lock().await;
        let mut rows: Vec<CatalogEntry> = state
            .catalogs
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find(&self, kind: CatalogKind, id: Uuid) -> DomainResult<Option<CatalogEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .catalogs
            .iter()
            .find(|e| e.kind == kind && e.id == id)
            .cloned())
    }

    async fn insert(&self, entry: &CatalogEntry) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state
            .catalogs
            .iter()
            .any(|e| e.kind == entry.kind && e.name_key == entry.name_key)
        {
            return Err(conflict(format!("{} already exists", entry.name)));
        }
        state.catalogs.push(entry.clone());
        Ok(())
    }

    async fn get_or_create(&self, kind: CatalogKind, name: &str) -> DomainResult<CatalogEntry> {
        let mut state = self.state.lock().await;
        let key = normalize_key(name);
        if let Some(existing) = state
            .catalogs
            .iter()
            .find(|e| e.kind == kind && e.name_key == key)
        {
            return Ok(existing.clone());
        }
        let entry = CatalogEntry::new(kind, name, Utc::now());
        state.catalogs.push(entry.clone());
        Ok(entry)
    }

    async fn rename(&self, kind: CatalogKind, id: Uuid, name: &str) -> DomainResult<CatalogEntry> {
        let mut state = self.state.lock().await;
        let key = normalize_key(name);
        if state
            .catalogs
            .iter()
            .any(|e| e.kind == kind && e.id != id && e.name_key == key)
        {
            return Err(conflict(format!("{} already exists", name.trim())));
        }
        let entry = state
            .catalogs
            .iter_mut()
            .find(|e| e.kind == kind && e.id == id)
            .ok_or_else(|| DomainError::not_found("Catalog entry"))?;
        entry.name = name.trim().to_string();
        entry.name_key = key;
        Ok(entry.clone())
    }

    async fn delete(&self, kind: CatalogKind, id: Uuid) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let referenced = state.devices.iter().any(|d| {
            let reference = match kind {
                CatalogKind::DeviceType => d.type_id,
                CatalogKind::DeviceStatus => d.status_id,
                CatalogKind::OperatingSystem => d.os_id,
            };
            reference == Some(id)
        });
        if referenced {
            return Err(DomainError::DependencyInUse(
                "catalog entry is referenced by devices".into(),
            ));
        }
        let before = state.catalogs.len();
        state.catalogs.retain(|e| !(e.kind == kind && e.id == id));
        if state.catalogs.len() == before {
            return Err(DomainError::not_found("Catalog entry"));
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceStore for MemoryStore {
    async fn insert(&self, device: &Device) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.check_device_keys(device)?;
        state.devices.push(device.clone());
        Ok(())
    }

    async fn update_with(
        &self,
        scope: &TenantScope,
        id: Uuid,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)> {
        let mut state = self.state.lock().await;
        let index = state
            .devices
            .iter()
            .position(|d| d.id == id && visible(scope, d))
            .ok_or_else(|| DomainError::not_found("Device"))?;
        let prior = state.devices[index].clone();
        let next = apply(&prior)?;
        state.check_device_keys(&next)?;
        state.devices[index] = next.clone();
        Ok((prior, next))
    }

    async fn upsert_by_serial(
        &self,
        tenant_id: Uuid,
        serial: &str,
        apply: DeviceUpsert<'_>,
    ) -> DomainResult<(Option<Device>, Device)> {
        let mut state = self.state.lock().await;
        let index = state
            .devices
            .iter()
            .position(|d| d.tenant_id == tenant_id && d.serial.as_deref() == Some(serial));
        let prior = index.map(|i| state.devices[i].clone());
        let next = apply(prior.as_ref())?;
        state.check_device_keys(&next)?;
        match index {
            Some(i) => state.devices[i] = next.clone(),
            None => state.devices.push(next.clone()),
        }
        Ok((prior, next))
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        if state
            .maintenances
            .iter()
            .any(|m| m.device_id == id && m.is_live())
        {
            return Err(DomainError::DependencyInUse("device still has maintenances".into()));
        }
        let device = state
            .devices
            .iter_mut()
            .find(|d| d.id == id && visible(scope, &**d))
            .ok_or_else(|| DomainError::not_found("Device"))?;
        device.state = RecordState::SoftDeleted { at };
        device.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Device>> {
        let state = self.state.lock().await;
        Ok(state.devices.iter().find(|d| d.id == id && visible(scope, &**d)).cloned())
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &DeviceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Device>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Device> = state
            .devices
            .iter()
            .filter(|d| visible(scope, &**d) && filter.matches(d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Page::from_vec(rows, page))
    }
}

#[async_trait]
impl MaintenanceStore for MemoryStore {
    async fn insert(&self, maintenance: &Maintenance) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.maintenances.push(maintenance.clone());
        Ok(())
    }

    async fn update(&self, scope: &TenantScope, maintenance: &Maintenance) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        replace_visible(&mut state.maintenances, scope, maintenance, "Maintenance")
    }

    async fn soft_delete(&self, scope: &TenantScope, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let maintenance = state
            .maintenances
            .iter_mut()
            .find(|m| m.id == id && visible(scope, &**m))
            .ok_or_else(|| DomainError::not_found("Maintenance"))?;
        maintenance.state = RecordState::SoftDeleted { at };
        maintenance.updated_at = at;
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Maintenance>> {
        let state = self.state.lock().await;
        Ok(state
            .maintenances
            .iter()
            .find(|m| m.id == id && visible(scope, &**m))
            .cloned())
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &MaintenanceFilter,
        page: PageRequest,
    ) -> DomainResult<Page<Maintenance>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Maintenance> = state
            .maintenances
            .iter()
            .filter(|m| visible(scope, &**m) && filter.matches(m))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.scheduled_date.cmp(&a.scheduled_date));
        Ok(Page::from_vec(rows, page))
    }

    async fn list_due(&self, from: NaiveDate, until: NaiveDate) -> DomainResult<Vec<MaintenanceReminder>> {
        let state = self.state.lock().await;
        let mut due: Vec<MaintenanceReminder> = state
            .maintenances
            .iter()
            .filter(|m| m.awaits_reminder(from, until))
            .filter_map(|m| {
                let device = state.devices.iter().find(|d| d.id == m.device_id && d.is_live())?;
                let tenant = state
                    .tenants
                    .iter()
                    .find(|t| t.id == m.tenant_id && t.state.is_active())?;
                Some(MaintenanceReminder {
                    maintenance: m.clone(),
                    device_name: device.name.clone(),
                    tenant_name: tenant.name.clone(),
                })
            })
            .collect();
        due.sort_by(|a, b| a.maintenance.scheduled_date.cmp(&b.maintenance.scheduled_date));
        Ok(due)
    }

    async fn mark_reminded(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let maintenance = state
            .maintenances
            .iter_mut()
            .find(|m| m.id == id && m.is_live())
            .ok_or_else(|| DomainError::not_found("Maintenance"))?;
        maintenance.reminded_at = Some(at);
        Ok(())
    }
}

#[async_trait]
impl DisposalStore for MemoryStore {
    async fn insert_with_device(
        &self,
        scope: &TenantScope,
        disposal: &Disposal,
        apply: DeviceUpdate<'_>,
    ) -> DomainResult<(Device, Device)> {
        let mut state = self.state.lock().await;
        let index = state
            .devices
            .iter()
            .position(|d| d.id == disposal.device_id && visible(scope, d))
            .ok_or_else(|| DomainError::not_found("Device"))?;
        if state.disposals.iter().any(|d| d.device_id == disposal.device_id) {
            return Err(conflict("device already has a disposal record"));
        }
        let prior = state.devices[index].clone();
        let next = apply(&prior)?;
        state.check_device_keys(&next)?;
        state.devices[index] = next.clone();
        state.disposals.push(disposal.clone());
        Ok((prior, next))
    }

    async fn update(&self, scope: &TenantScope, disposal: &Disposal) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        replace_visible(&mut state.disposals, scope, disposal, "Disposal")
    }

    async fn delete(&self, scope: &TenantScope, id: Uuid) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        let index = state
            .disposals
            .iter()
            .position(|d| d.id == id && visible(scope, d))
            .ok_or_else(|| DomainError::not_found("Disposal"))?;
        state.disposals.remove(index);
        Ok(())
    }

    async fn find(&self, scope: &TenantScope, id: Uuid) -> DomainResult<Option<Disposal>> {
        let state = self.state.lock().await;
        Ok(state.disposals.iter().find(|d| d.id == id && visible(scope, &**d)).cloned())
    }

    async fn find_by_device(&self, scope: &TenantScope, device_id: Uuid) -> DomainResult<Option<Disposal>> {
        let state = self.state.lock().await;
        Ok(state
            .disposals
            .iter()
            .find(|d| d.device_id == device_id && visible(scope, &**d))
            .cloned())
    }

    async fn list(&self, scope: &TenantScope, page: PageRequest) -> DomainResult<Page<Disposal>> {
        let state = self.state.lock().await;
        let mut rows: Vec<Disposal> = state
            .disposals
            .iter()
            .filter(|d| visible(scope, &**d))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.disposal_date.cmp(&a.disposal_date));
        Ok(Page::from_vec(rows, page))
    }
}

#[async_trait]
impl AuditLogStore for MemoryStore {
    async fn insert(&self, entry: &AuditLog) -> DomainResult<()> {
        let mut state = self.state.lock().await;
        state.audit_logs.push(entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        scope: &TenantScope,
        filter: &AuditLogFilter,
        page: PageRequest,
    ) -> DomainResult<Page<AuditLog>> {
        let state = self.state.lock().await;
        let rows = state
            .audit_logs
            .iter()
            .rev()
            .filter(|e| {
                let in_scope = scope.is_unrestricted()
                    || e.tenant_id.is_some_and(|t| scope.allows(t));
                in_scope && filter.matches(e)
            })
            .cloned();
        Ok(paged(rows, page))
    }
}
