//! Domain services for the hotel asset manager.
//!
//! Every service resolves the caller's tenant scope, authorizes the operation,
//! talks to the store ports and records audit entries for mutations.

pub mod access_policy;
pub mod audit;
pub mod catalogs;
pub mod devices;
pub mod disposals;
pub mod import;
pub mod lifecycle;
pub mod maintenances;
pub mod notification;
pub mod organization;
pub mod principals;
pub mod reminders;
pub mod scope;
pub mod staff;
pub mod tenants;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

pub use audit::{AuditEvent, AuditRecorder, AuditService};
pub use catalogs::CatalogService;
pub use devices::DeviceService;
pub use disposals::DisposalService;
pub use import::ImportService;
pub use maintenances::MaintenanceService;
pub use notification::{
    MaintenanceReminderPayload, MockNotificationService, NotificationResult, NotificationService,
    NotificationType,
};
pub use organization::{AreaService, DepartmentService};
pub use principals::PrincipalService;
pub use reminders::{ReminderRunReport, ReminderService};
pub use scope::TenantScope;
pub use staff::StaffUserService;
pub use tenants::TenantService;

use crate::error::{DomainError, DomainResult};
use crate::models::bulk_import::MAX_IMPORT_ROWS;
use crate::store::Stores;

/// Tunables passed down from configuration.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Days ahead of today a pending maintenance triggers a reminder.
    pub reminder_window_days: u32,
    pub import_max_rows: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            reminder_window_days: 7,
            import_max_rows: MAX_IMPORT_ROWS,
        }
    }
}

/// All services wired against one set of stores.
#[derive(Clone)]
pub struct Services {
    pub tenants: TenantService,
    pub principals: PrincipalService,
    pub departments: DepartmentService,
    pub areas: AreaService,
    pub staff: StaffUserService,
    pub catalogs: CatalogService,
    pub devices: DeviceService,
    pub maintenances: MaintenanceService,
    pub disposals: DisposalService,
    pub audit: AuditService,
    pub import: ImportService,
    pub reminders: ReminderService,
}

impl Services {
    pub fn new(
        stores: Stores,
        notifier: Arc<dyn NotificationService>,
        settings: ServiceSettings,
    ) -> Self {
        let recorder = AuditRecorder::new(stores.audit_logs.clone());

        Self {
            tenants: TenantService::new(stores.clone(), recorder.clone()),
            principals: PrincipalService::new(stores.clone(), recorder.clone()),
            departments: DepartmentService::new(stores.clone(), recorder.clone()),
            areas: AreaService::new(stores.clone(), recorder.clone()),
            staff: StaffUserService::new(stores.clone(), recorder.clone()),
            catalogs: CatalogService::new(stores.clone(), recorder.clone()),
            devices: DeviceService::new(stores.clone(), recorder.clone()),
            maintenances: MaintenanceService::new(stores.clone(), recorder.clone()),
            disposals: DisposalService::new(stores.clone(), recorder.clone()),
            audit: AuditService::new(stores.audit_logs.clone()),
            import: ImportService::new(stores.clone(), recorder)
                .with_max_rows(settings.import_max_rows),
            reminders: ReminderService::new(
                stores.maintenances.clone(),
                stores.principals.clone(),
                notifier,
                settings.reminder_window_days,
            ),
        }
    }
}

/// Turns a missing lookup into `NotFound`. Records outside the caller's scope
/// come back as `None` from the stores, so both cases look the same.
pub(crate) fn found<T>(value: Option<T>, entity: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::not_found(entity))
}
