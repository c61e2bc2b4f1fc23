//! Domain models.

pub mod access;
pub mod audit_log;
pub mod bulk_import;
pub mod catalog;
pub mod device;
pub mod disposal;
pub mod lifecycle;
pub mod maintenance;
pub mod nullable;
pub mod organization;
pub mod page;
pub mod principal;
pub mod session;
pub mod staff_user;
pub mod tenant;

pub use access::{Action, ResourceKind};
pub use audit_log::{AuditAction, AuditLog, AuditLogFilter};
pub use bulk_import::{ImportIssue, ImportReport, TabularSheet};
pub use catalog::{CatalogEntry, CatalogKind, CatalogNameRequest, DisposedStatuses};
pub use device::{CreateDeviceRequest, Device, DeviceFilter, UpdateDeviceRequest};
pub use disposal::{CreateDisposalRequest, Disposal, UpdateDisposalRequest};
pub use lifecycle::{RecordState, TenantOwned};
pub use maintenance::{
    CreateMaintenanceRequest, Maintenance, MaintenanceFilter, MaintenanceKind, MaintenanceReminder,
    MaintenanceStatus, UpdateMaintenanceRequest,
};
pub use organization::{
    Area, AreaWithDepartment, CreateAreaRequest, CreateDepartmentRequest, Department,
    UpdateAreaRequest, UpdateDepartmentRequest,
};
pub use page::{Page, Pagination};
pub use principal::{
    CreatePrincipalRequest, LoginRequest, LoginResponse, Principal, PrincipalCredentials, Role,
    UpdatePrincipalRequest,
};
pub use session::Session;
pub use staff_user::{CreateStaffUserRequest, StaffUser, UpdateStaffUserRequest};
pub use tenant::{CreateTenantRequest, Tenant, UpdateTenantRequest};
