//! HTTP route handlers.

pub mod audit_logs;
pub mod auth;
pub mod catalogs;
pub mod devices;
pub mod disposals;
pub mod health;
pub mod import;
pub mod maintenances;
pub mod organization;
pub mod principals;
pub mod staff_users;
pub mod tenants;
