//! PostgreSQL persistence for the asset manager.
//!
//! This crate contains:
//! - Connection pool management
//! - Row mappings
//! - Repository implementations of the domain store ports
//! - Embedded schema migrations under `src/migrations`

pub mod db;
pub mod entities;
pub(crate) mod error;
pub mod metrics;
pub mod repositories;

use domain::store::Stores;
use sqlx::PgPool;
use std::sync::Arc;

use repositories::{
    AreaRepository, AuditLogRepository, CatalogRepository, DepartmentRepository,
    DeviceRepository, DisposalRepository, MaintenanceRepository, PrincipalRepository,
    StaffUserRepository, TenantRepository,
};

/// Every store port backed by the given pool.
pub fn stores(pool: PgPool) -> Stores {
    Stores {
        tenants: Arc::new(TenantRepository::new(pool.clone())),
        principals: Arc::new(PrincipalRepository::new(pool.clone())),
        departments: Arc::new(DepartmentRepository::new(pool.clone())),
        areas: Arc::new(AreaRepository::new(pool.clone())),
        staff: Arc::new(StaffUserRepository::new(pool.clone())),
        catalogs: Arc::new(CatalogRepository::new(pool.clone())),
        devices: Arc::new(DeviceRepository::new(pool.clone())),
        maintenances: Arc::new(MaintenanceRepository::new(pool.clone())),
        disposals: Arc::new(DisposalRepository::new(pool.clone())),
        audit_logs: Arc::new(AuditLogRepository::new(pool)),
    }
}
