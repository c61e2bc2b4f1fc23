//! Bulk device import from a tabular sheet.
//!
//! Headers are matched against per-field synonyms, foreign keys are resolved
//! against per-run caches and every row succeeds or fails on its own.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::json;
use shared::text::{non_blank, normalize_key};
use shared::validation::{validate_ip_address, validate_mac_address};
use std::collections::HashMap;
use uuid::Uuid;

use super::access_policy::authorize;
use super::audit::{AuditEvent, AuditRecorder};
use super::lifecycle::{apply_import, DeviceDraft};
use super::scope;
use crate::error::{DomainError, DomainResult};
use crate::models::bulk_import::MAX_IMPORT_ROWS;
use crate::models::{
    Action, AuditAction, CatalogKind, Device, DisposedStatuses, ImportIssue, ImportReport,
    ResourceKind, Session, TabularSheet,
};
use crate::store::Stores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Tag,
    Name,
    Serial,
    DeviceType,
    Status,
    OperatingSystem,
    AssignedUser,
    Area,
    Department,
    Brand,
    Model,
    IpAddress,
    MacAddress,
    WarrantyStart,
    WarrantyEnd,
    DisposalDate,
    DisposalReason,
    DisposalNotes,
    Notes,
}

/// Recognized header spellings per field, compared after [`normalize_key`].
const HEADER_SYNONYMS: &[(Field, &[&str])] = &[
    (Field::Tag, &["etiqueta", "tag", "asset tag", "activo", "codigo"]),
    (
        Field::Name,
        &["nombre", "name", "nombre equipo", "equipo", "device", "device name", "hostname"],
    ),
    (
        Field::Serial,
        &[
            "serie",
            "n° serie",
            "nº serie",
            "no. serie",
            "numero de serie",
            "serial",
            "serial number",
            "sn",
        ],
    ),
    (Field::DeviceType, &["tipo", "tipo equipo", "tipo de equipo", "type", "device type"]),
    (Field::Status, &["estado", "status"]),
    (Field::OperatingSystem, &["sistema operativo", "so", "os", "operating system"]),
    (
        Field::AssignedUser,
        &["usuario", "usuario asignado", "asignado a", "user", "assigned user", "assigned to"],
    ),
    (Field::Area, &["area"]),
    (Field::Department, &["departamento", "depto", "department"]),
    (Field::Brand, &["marca", "brand", "fabricante", "manufacturer"]),
    (Field::Model, &["modelo", "model"]),
    (Field::IpAddress, &["ip", "direccion ip", "ip address"]),
    (Field::MacAddress, &["mac", "direccion mac", "mac address"]),
    (Field::WarrantyStart, &["inicio garantia", "garantia inicio", "warranty start"]),
    (
        Field::WarrantyEnd,
        &["fin garantia", "garantia fin", "vencimiento garantia", "warranty end"],
    ),
    (Field::DisposalDate, &["fecha baja", "fecha de baja", "disposal date"]),
    (Field::DisposalReason, &["motivo baja", "motivo de baja", "disposal reason"]),
    (Field::DisposalNotes, &["observaciones baja", "disposal notes"]),
    (Field::Notes, &["observaciones", "notas", "notes", "comentarios"]),
];

fn field_for_header(header: &str) -> Option<Field> {
    let key = normalize_key(header);
    if key.is_empty() {
        return None;
    }
    HEADER_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| normalize_key(s) == key))
        .map(|(field, _)| *field)
}

/// Column index of each recognized field. The first matching column wins.
#[derive(Debug, Default)]
struct ColumnMap(HashMap<Field, usize>);

impl ColumnMap {
    fn from_header(header: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (index, cell) in header.iter().enumerate() {
            if let Some(field) = field_for_header(cell) {
                columns.entry(field).or_insert(index);
            }
        }
        Self(columns)
    }

    fn has(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    fn cell(&self, row: &[String], field: Field) -> Option<String> {
        self.0
            .get(&field)
            .and_then(|i| row.get(*i))
            .and_then(|v| non_blank(v))
    }
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and RFC 3339 timestamps.
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| format!("invalid date '{}'", value))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => parse_date(value).map(|d| d.and_time(NaiveTime::MIN).and_utc()),
    }
}

/// Per-run lookup caches. Nothing outlives a single import.
struct RunCaches {
    staff_by_login: HashMap<String, Uuid>,
    staff_by_name: HashMap<String, Uuid>,
    area_by_pair: HashMap<(String, String), Uuid>,
    area_by_name: HashMap<String, Uuid>,
    catalog: HashMap<(CatalogKind, String), Uuid>,
    disposed: DisposedStatuses,
}

impl RunCaches {
    async fn load(stores: &Stores, tenant_id: Uuid) -> DomainResult<Self> {
        let mut staff_by_login = HashMap::new();
        let mut staff_by_name = HashMap::new();
        for staff in stores.staff.list_all(tenant_id).await? {
            if let Some(login) = staff.login.as_deref() {
                staff_by_login.entry(normalize_key(login)).or_insert(staff.id);
            }
            staff_by_name.entry(normalize_key(&staff.full_name)).or_insert(staff.id);
        }

        let mut area_by_pair = HashMap::new();
        let mut area_by_name = HashMap::new();
        for row in stores.areas.list_with_departments(tenant_id).await? {
            let area = normalize_key(&row.area.name);
            area_by_pair
                .entry((area.clone(), normalize_key(&row.department_name)))
                .or_insert(row.area.id);
            area_by_name.entry(area).or_insert(row.area.id);
        }

        let statuses = stores.catalogs.list(CatalogKind::DeviceStatus).await?;

        Ok(Self {
            staff_by_login,
            staff_by_name,
            area_by_pair,
            area_by_name,
            catalog: HashMap::new(),
            disposed: DisposedStatuses::from_entries(&statuses),
        })
    }

    fn staff(&self, reference: &str) -> Option<Uuid> {
        let key = normalize_key(reference);
        self.staff_by_login
            .get(&key)
            .or_else(|| self.staff_by_name.get(&key))
            .copied()
    }

    fn area(&self, area: &str, department: Option<&str>) -> Option<Uuid> {
        let area = normalize_key(area);
        department
            .and_then(|d| self.area_by_pair.get(&(area.clone(), normalize_key(d))))
            .or_else(|| self.area_by_name.get(&area))
            .copied()
    }

    async fn catalog(&mut self, stores: &Stores, kind: CatalogKind, name: &str) -> DomainResult<Uuid> {
        let key = normalize_key(name);
        if let Some(id) = self.catalog.get(&(kind, key.clone())) {
            return Ok(*id);
        }
        let entry = stores.catalogs.get_or_create(kind, name).await?;
        self.disposed.observe(&entry);
        self.catalog.insert((kind, key), entry.id);
        Ok(entry.id)
    }
}

async fn resolve_catalog(
    stores: &Stores,
    caches: &mut RunCaches,
    kind: CatalogKind,
    value: Option<String>,
) -> Result<Option<Uuid>, String> {
    match value {
        Some(name) => caches
            .catalog(stores, kind, &name)
            .await
            .map(Some)
            .map_err(|e| format!("{} '{}': {}", kind, name, e)),
        None => Ok(None),
    }
}

/// Outcome of resolving one row into a draft.
struct RowDraft {
    draft: DeviceDraft,
    warnings: Vec<String>,
}

#[derive(Clone)]
pub struct ImportService {
    stores: Stores,
    audit: AuditRecorder,
    max_rows: usize,
}

impl ImportService {
    pub fn new(stores: Stores, audit: AuditRecorder) -> Self {
        Self {
            stores,
            audit,
            max_rows: MAX_IMPORT_ROWS,
        }
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Imports every data row of `sheet` into the session's single active hotel.
    pub async fn import(&self, session: &Session, sheet: &TabularSheet) -> DomainResult<ImportReport> {
        let scope = scope::resolve(session);
        authorize(session, &scope, Action::Import, ResourceKind::Device, None)?;
        let tenant_id = scope.single_tenant().ok_or_else(|| {
            DomainError::business_rule("bulk import requires selecting exactly one hotel")
        })?;

        let header = sheet
            .header()
            .ok_or_else(|| DomainError::validation("the sheet is empty"))?;
        let columns = ColumnMap::from_header(header);
        if !columns.has(Field::Name) && !columns.has(Field::Serial) {
            return Err(DomainError::validation(
                "the sheet needs a device name or serial number column",
            ));
        }
        if sheet.data_row_count() > self.max_rows {
            return Err(DomainError::validation(format!(
                "the sheet has {} rows, the maximum is {}",
                sheet.data_row_count(),
                self.max_rows
            )));
        }

        let mut caches = RunCaches::load(&self.stores, tenant_id).await?;
        let mut report = ImportReport::default();

        for (row_number, row) in sheet.data_rows() {
            let name = columns.cell(row, Field::Name);
            let serial = columns.cell(row, Field::Serial);
            if name.is_none() && serial.is_none() {
                report.skipped += 1;
                continue;
            }
            let label = name.clone().or_else(|| serial.clone());

            let resolved = match self.resolve_row(&columns, row, &mut caches).await {
                Ok(resolved) => resolved,
                Err(message) => {
                    report.errors.push(ImportIssue {
                        row: row_number,
                        device: label,
                        message,
                    });
                    continue;
                }
            };
            for message in resolved.warnings {
                report.warnings.push(ImportIssue {
                    row: row_number,
                    device: label.clone(),
                    message,
                });
            }

            match self.write_row(tenant_id, &resolved.draft, &caches.disposed).await {
                Ok(updated) => {
                    report.success_count += 1;
                    if updated {
                        report.updated += 1;
                    } else {
                        report.created += 1;
                    }
                }
                Err(e) => report.errors.push(ImportIssue {
                    row: row_number,
                    device: label,
                    message: e.to_string(),
                }),
            }
        }

        tracing::info!(
            tenant_id = %tenant_id,
            principal_id = %session.principal_id(),
            success = report.success_count,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Device import finished"
        );

        if report.success_count > 0 {
            let summary = json!({
                "tenantId": tenant_id,
                "successCount": report.success_count,
                "created": report.created,
                "updated": report.updated,
                "skipped": report.skipped,
                "errorCount": report.errors.len(),
                "warningCount": report.warnings.len(),
            });
            self.audit
                .record(
                    AuditEvent::new(AuditAction::BulkImport, ResourceKind::Device)
                        .with_after(&summary)
                        .with_detail(format!("{} rows imported", report.success_count)),
                    Some(session),
                )
                .await;
        }

        Ok(report)
    }

    /// Turns the raw cells into a draft. Errors are row-fatal messages.
    async fn resolve_row(
        &self,
        columns: &ColumnMap,
        row: &[String],
        caches: &mut RunCaches,
    ) -> Result<RowDraft, String> {
        let cell = |field| columns.cell(row, field);
        let mut warnings = Vec::new();

        let ip_address = cell(Field::IpAddress);
        if let Some(ip) = ip_address.as_deref() {
            validate_ip_address(ip).map_err(|_| format!("invalid IP address '{}'", ip))?;
        }
        let mac_address = cell(Field::MacAddress);
        if let Some(mac) = mac_address.as_deref() {
            validate_mac_address(mac).map_err(|_| format!("invalid MAC address '{}'", mac))?;
        }

        let warranty_start = cell(Field::WarrantyStart).map(|v| parse_date(&v)).transpose()?;
        let warranty_end = cell(Field::WarrantyEnd).map(|v| parse_date(&v)).transpose()?;
        let disposal_date = cell(Field::DisposalDate)
            .map(|v| parse_timestamp(&v))
            .transpose()?;

        let assigned_user_id = match cell(Field::AssignedUser) {
            Some(reference) => {
                let found = caches.staff(&reference);
                if found.is_none() {
                    warnings.push(format!("assigned user '{}' not found", reference));
                }
                found
            }
            None => None,
        };

        let area_id = match cell(Field::Area) {
            Some(area) => {
                let department = cell(Field::Department);
                let found = caches.area(&area, department.as_deref());
                if found.is_none() {
                    warnings.push(format!("area '{}' not found", area));
                }
                found
            }
            None => None,
        };

        let stores = &self.stores;
        let type_id =
            resolve_catalog(stores, caches, CatalogKind::DeviceType, cell(Field::DeviceType)).await?;
        let status_id =
            resolve_catalog(stores, caches, CatalogKind::DeviceStatus, cell(Field::Status)).await?;
        let os_id = resolve_catalog(
            stores,
            caches,
            CatalogKind::OperatingSystem,
            cell(Field::OperatingSystem),
        )
        .await?;

        Ok(RowDraft {
            draft: DeviceDraft {
                tag: cell(Field::Tag),
                name: cell(Field::Name),
                serial: cell(Field::Serial),
                brand: cell(Field::Brand),
                model: cell(Field::Model),
                ip_address,
                mac_address,
                type_id,
                status_id,
                os_id,
                area_id,
                assigned_user_id,
                warranty_start,
                warranty_end,
                disposal_date,
                disposal_reason: cell(Field::DisposalReason),
                disposal_notes: cell(Field::DisposalNotes),
                notes: cell(Field::Notes),
            },
            warnings,
        })
    }

    /// Writes one row. Returns whether an existing device was updated.
    async fn write_row(
        &self,
        tenant_id: Uuid,
        draft: &DeviceDraft,
        disposed: &DisposedStatuses,
    ) -> DomainResult<bool> {
        let now = Utc::now();
        match draft.serial.as_deref() {
            Some(serial) => {
                let (prior, _) = self
                    .stores
                    .devices
                    .upsert_by_serial(tenant_id, serial, &|prior: Option<&Device>| {
                        apply_import(prior, draft, tenant_id, disposed, now)
                    })
                    .await?;
                Ok(prior.is_some())
            }
            None => {
                let device = apply_import(None, draft, tenant_id, disposed, now)?;
                self.stores.devices.insert(&device).await?;
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scope::TenantScope;
    use crate::models::{
        AuditLogFilter, CatalogEntry, CreateStaffUserRequest, CreateTenantRequest, Department,
        Area, DeviceFilter, Principal, RecordState, Role, StaffUser, Tenant,
    };
    use crate::store::memory::MemoryStore;
    use crate::store::{
        AreaStore, AuditLogStore, CatalogStore, DepartmentStore, DeviceStore, StaffUserStore,
        TenantStore,
    };
    use shared::pagination::PageRequest;
    use std::sync::Arc;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: ImportService,
        tenant: Tenant,
    }

    async fn tenant(store: &MemoryStore, code: &str) -> Tenant {
        let tenant = Tenant::new(
            CreateTenantRequest {
                name: format!("Hotel {}", code),
                code: code.into(),
                active: None,
            },
            Utc::now(),
        );
        TenantStore::insert(store, &tenant).await.unwrap();
        tenant
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::from_memory(store.clone());
        let service = ImportService::new(stores.clone(), AuditRecorder::new(stores.audit_logs));
        let tenant = tenant(&store, "CUN").await;
        Fixture { store, service, tenant }
    }

    fn session_for(role: Role, tenants: Vec<Uuid>, active: Option<Uuid>) -> Session {
        let now = Utc::now();
        let principal = Principal {
            id: Uuid::new_v4(),
            username: "importer".into(),
            email: None,
            role,
            tenant_ids: tenants,
            protected: false,
            created_at: now,
            updated_at: now,
            state: RecordState::Active,
        };
        Session::establish(principal, active, true).unwrap()
    }

    fn sheet(rows: &[&[&str]]) -> TabularSheet {
        TabularSheet::new(
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    async fn devices(store: &MemoryStore, tenant_id: Uuid) -> Vec<Device> {
        DeviceStore::list(
            store,
            &TenantScope::ExactTenant(tenant_id),
            &DeviceFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap()
        .data
    }

    #[test]
    fn test_header_synonyms_ignore_case_and_accents() {
        assert_eq!(field_for_header("N° Serie"), Some(Field::Serial));
        assert_eq!(field_for_header("NÚMERO DE SERIE"), Some(Field::Serial));
        assert_eq!(field_for_header("Área"), Some(Field::Area));
        assert_eq!(field_for_header("Dirección IP"), Some(Field::IpAddress));
        assert_eq!(field_for_header("Observaciones Baja"), Some(Field::DisposalNotes));
        assert_eq!(field_for_header("Observaciones"), Some(Field::Notes));
        assert_eq!(field_for_header("Precio"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(parse_date("2025-03-09").unwrap(), expected);
        assert_eq!(parse_date("09/03/2025").unwrap(), expected);
        assert_eq!(parse_date("2025-03-09T10:00:00Z").unwrap(), expected);
        assert!(parse_date("March 9").is_err());
    }

    #[tokio::test]
    async fn test_requires_exactly_one_tenant() {
        let f = fixture().await;
        let data = sheet(&[&["Nombre"], &["PC"]]);

        let global = session_for(Role::GlobalRoot, vec![], None);
        let multi = session_for(Role::TenantAdmin, vec![f.tenant.id, Uuid::new_v4()], None);
        for session in [global, multi] {
            assert!(matches!(
                f.service.import(&session, &data).await,
                Err(DomainError::BusinessRuleViolation(_))
            ));
        }

        let guest = session_for(Role::TenantGuest, vec![f.tenant.id], Some(f.tenant.id));
        assert!(matches!(
            f.service.import(&guest, &data).await,
            Err(DomainError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_single_assigned_hotel_needs_no_selection() {
        let f = fixture().await;
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], None);
        let data = sheet(&[&["nombre", "serie"], &["PC", "SN-1"]]);

        let report = f.service.import(&admin, &data).await.unwrap();
        assert_eq!(report.created, 1);
        assert!(report.errors.is_empty());

        let imported = devices(&f.store, f.tenant.id).await;
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].serial.as_deref(), Some("SN-1"));
    }

    #[tokio::test]
    async fn test_rejects_sheet_without_identifying_columns() {
        let f = fixture().await;
        let session = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        let data = sheet(&[&["Marca", "Modelo"], &["HP", "ProBook"]]);

        assert!(matches!(
            f.service.import(&session, &data).await,
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_serial_upsert_revives_and_isolates_tenants() {
        let f = fixture().await;
        let other = tenant(&f.store, "MEX").await;

        let mut existing = Device::blank(f.tenant.id, "PC Recepción", Utc::now());
        existing.serial = Some("SN-001".into());
        DeviceStore::insert(f.store.as_ref(), &existing).await.unwrap();
        DeviceStore::soft_delete(
            f.store.as_ref(),
            &TenantScope::ExactTenant(f.tenant.id),
            existing.id,
            Utc::now(),
        )
        .await
        .unwrap();

        let data = sheet(&[&["Serie", "Marca"], &["SN-001", "Dell"]]);

        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        let report = f.service.import(&admin, &data).await.unwrap();
        assert_eq!((report.success_count, report.updated, report.created), (1, 1, 0));

        let mine = devices(&f.store, f.tenant.id).await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, existing.id);
        assert_eq!(mine[0].brand.as_deref(), Some("Dell"));
        assert_eq!(mine[0].name, "PC Recepción");

        let other_admin = session_for(Role::TenantAdmin, vec![other.id], Some(other.id));
        let report = f.service.import(&other_admin, &data).await.unwrap();
        assert_eq!(report.created, 1);
        let theirs = devices(&f.store, other.id).await;
        assert_eq!(theirs.len(), 1);
        assert_ne!(theirs[0].id, existing.id);
    }

    #[tokio::test]
    async fn test_unknown_user_is_a_single_warning() {
        let f = fixture().await;
        let staff = StaffUser::new(
            f.tenant.id,
            CreateStaffUserRequest {
                tenant_id: None,
                full_name: "María Pérez".into(),
                login: Some("mperez".into()),
                email: None,
                position: None,
                department_id: None,
            },
            Utc::now(),
        );
        StaffUserStore::insert(f.store.as_ref(), &staff).await.unwrap();

        let data = sheet(&[
            &["Nombre", "Usuario Asignado"],
            &["Laptop 1", "MPEREZ"],
            &["Laptop 2", "maria perez"],
            &["Laptop 3", "Juan Nadie"],
        ]);
        let admin = session_for(Role::TenantAssistant, vec![f.tenant.id], Some(f.tenant.id));
        let report = f.service.import(&admin, &data).await.unwrap();

        assert_eq!(report.success_count, 3);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 4);
        assert_eq!(report.warnings[0].device.as_deref(), Some("Laptop 3"));

        let all = devices(&f.store, f.tenant.id).await;
        let by_name = |n: &str| all.iter().find(|d| d.name == n).unwrap().assigned_user_id;
        assert_eq!(by_name("Laptop 1"), Some(staff.id));
        assert_eq!(by_name("Laptop 2"), Some(staff.id));
        assert_eq!(by_name("Laptop 3"), None);
    }

    #[tokio::test]
    async fn test_area_resolution_prefers_department_pair() {
        let f = fixture().await;
        let now = Utc::now();
        let front = Department::new(f.tenant.id, "Recepción", now);
        let it = Department::new(f.tenant.id, "Sistemas", now);
        DepartmentStore::insert(f.store.as_ref(), &front).await.unwrap();
        DepartmentStore::insert(f.store.as_ref(), &it).await.unwrap();
        let lobby_front = Area::new(&front, "Lobby", now);
        let lobby_it = Area::new(&it, "Lobby", now);
        AreaStore::insert(f.store.as_ref(), &lobby_front).await.unwrap();
        AreaStore::insert(f.store.as_ref(), &lobby_it).await.unwrap();

        let data = sheet(&[
            &["Nombre", "Área", "Departamento"],
            &["AP 1", "lobby", "SISTEMAS"],
            &["AP 2", "Bodega", ""],
        ]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        let report = f.service.import(&admin, &data).await.unwrap();

        assert_eq!(report.success_count, 2);
        assert_eq!(report.warnings.len(), 1);
        let all = devices(&f.store, f.tenant.id).await;
        let ap1 = all.iter().find(|d| d.name == "AP 1").unwrap();
        assert_eq!(ap1.area_id, Some(lobby_it.id));
    }

    #[tokio::test]
    async fn test_catalog_spellings_share_one_entry() {
        let f = fixture().await;
        let data = sheet(&[
            &["Nombre", "Tipo"],
            &["PC 1", "Laptop"],
            &["PC 2", "LAPTOP"],
            &["PC 3", "láptop"],
        ]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        f.service.import(&admin, &data).await.unwrap();

        let types = CatalogStore::list(f.store.as_ref(), CatalogKind::DeviceType)
            .await
            .unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "Laptop");
        let all = devices(&f.store, f.tenant.id).await;
        assert!(all.iter().all(|d| d.type_id == Some(types[0].id)));
    }

    #[tokio::test]
    async fn test_row_errors_do_not_stop_the_batch() {
        let f = fixture().await;
        let data = sheet(&[
            &["Nombre", "Serie", "IP", "Fin Garantía"],
            &["Switch", "S-1", "10.0.0.1", "31/12/2027"],
            &["Impresora", "S-2", "10.0.0.300", ""],
            &["NAS", "S-3", "", "pronto"],
            &["", "", "", ""],
            &["Firewall", "S-4", "", ""],
        ]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        let report = f.service.import(&admin, &data).await.unwrap();

        assert_eq!(report.success_count, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].row, 3);
        assert_eq!(report.errors[0].device.as_deref(), Some("Impresora"));
        assert_eq!(report.errors[1].row, 4);
    }

    #[tokio::test]
    async fn test_disposed_status_sets_disposal_date() {
        let f = fixture().await;
        CatalogStore::insert(
            f.store.as_ref(),
            &CatalogEntry::new(CatalogKind::DeviceStatus, "Baja", Utc::now()),
        )
        .await
        .unwrap();

        let data = sheet(&[
            &["Nombre", "Serie", "Estado", "Motivo Baja"],
            &["Monitor", "M-1", "BAJA", "Pantalla rota"],
            &["Teclado", "K-1", "Activo", "ignorado"],
        ]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        f.service.import(&admin, &data).await.unwrap();

        let all = devices(&f.store, f.tenant.id).await;
        let monitor = all.iter().find(|d| d.name == "Monitor").unwrap();
        let keyboard = all.iter().find(|d| d.name == "Teclado").unwrap();
        assert!(monitor.disposal_date.is_some());
        assert_eq!(monitor.disposal_reason.as_deref(), Some("Pantalla rota"));
        assert!(!keyboard.has_disposal_fields());
    }

    #[tokio::test]
    async fn test_single_summary_audit_entry() {
        let f = fixture().await;
        let data = sheet(&[&["Nombre"], &["A"], &["B"], &["C"]]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        f.service.import(&admin, &data).await.unwrap();

        let entries = AuditLogStore::list(
            f.store.as_ref(),
            &TenantScope::Unrestricted,
            &AuditLogFilter::default(),
            PageRequest::default(),
        )
        .await
        .unwrap()
        .data;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::BulkImport);
        assert_eq!(entries[0].entity_id, Uuid::nil());
        assert_eq!(entries[0].tenant_id, Some(f.tenant.id));
    }

    #[tokio::test]
    async fn test_row_limit() {
        let f = fixture().await;
        let service = f.service.clone().with_max_rows(1);
        let data = sheet(&[&["Nombre"], &["A"], &["B"]]);
        let admin = session_for(Role::TenantAdmin, vec![f.tenant.id], Some(f.tenant.id));
        assert!(matches!(
            service.import(&admin, &data).await,
            Err(DomainError::ValidationFailed(_))
        ));
    }
}
