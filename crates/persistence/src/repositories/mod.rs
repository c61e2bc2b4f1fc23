//! PostgreSQL implementations of the domain store ports.
//!
//! Tenant-owned queries bind the caller's scope as a nullable uuid array:
//! `($n::uuid[] IS NULL OR tenant_id = ANY($n))`. `NULL` means unrestricted.

pub mod area;
pub mod audit_log;
pub mod catalog;
pub mod department;
pub mod device;
pub mod disposal;
pub mod maintenance;
pub mod principal;
pub mod staff_user;
pub mod tenant;

pub use area::AreaRepository;
pub use audit_log::AuditLogRepository;
pub use catalog::CatalogRepository;
pub use department::DepartmentRepository;
pub use device::DeviceRepository;
pub use disposal::DisposalRepository;
pub use maintenance::MaintenanceRepository;
pub use principal::PrincipalRepository;
pub use staff_user::StaffUserRepository;
pub use tenant::TenantRepository;

use domain::error::DomainError;
use domain::services::scope::TenantScope;
use uuid::Uuid;

pub(crate) fn scope_ids(scope: &TenantScope) -> Option<Vec<Uuid>> {
    scope.tenant_ids()
}

/// Maps "no row touched" to `NotFound`.
pub(crate) fn expect_one(rows_affected: u64, entity: &str) -> Result<(), DomainError> {
    if rows_affected == 0 {
        Err(DomainError::not_found(entity))
    } else {
        Ok(())
    }
}
