//! Row mappings. Each row converts into its domain model.

pub mod audit_log;
pub mod catalog;
pub mod device;
pub mod disposal;
pub mod maintenance;
pub mod organization;
pub mod principal;
pub mod staff_user;
pub mod tenant;

pub use audit_log::AuditLogRow;
pub use catalog::CatalogRow;
pub use device::DeviceRow;
pub use disposal::DisposalRow;
pub use maintenance::{MaintenanceReminderRow, MaintenanceRow};
pub use organization::{AreaRow, AreaWithDepartmentRow, DepartmentRow};
pub use principal::{PrincipalCredentialsRow, PrincipalRow};
pub use staff_user::StaffUserRow;
pub use tenant::TenantRow;
